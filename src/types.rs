use std::fmt;

/// The closed type universe of the bytecode format.
///
/// Tags are wire-stable: the writer emits them as one-byte type record
/// headers and the reader rebuilds types from them. `Fun` arities never
/// exceed 255; types form a DAG rooted at the leaf variants, so
/// structural equality (the derived one) always terminates.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ty {
    Void,
    UI8,
    I32,
    F32,
    F64,
    Bool,
    /// Dynamic boxed value: carries an inner value and its original type.
    Any,
    Fun { args: Vec<Ty>, ret: Box<Ty> },
}

impl Ty {
    pub fn fun(args: Vec<Ty>, ret: Ty) -> Ty {
        Ty::Fun {
            args,
            ret: Box::new(ret),
        }
    }

    /// Stable numeric tag used in the binary format.
    pub fn tag(&self) -> u8 {
        match self {
            Ty::Void => 0,
            Ty::UI8 => 1,
            Ty::I32 => 2,
            Ty::F32 => 3,
            Ty::F64 => 4,
            Ty::Bool => 5,
            Ty::Any => 6,
            Ty::Fun { .. } => 7,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Ty::UI8 | Ty::I32 | Ty::F32 | Ty::F64)
    }

    pub fn as_fun(&self) -> Option<(&[Ty], &Ty)> {
        match self {
            Ty::Fun { args, ret } => Some((args, ret)),
            _ => None,
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Void => f.write_str("void"),
            Ty::UI8 => f.write_str("ui8"),
            Ty::I32 => f.write_str("i32"),
            Ty::F32 => f.write_str("f32"),
            Ty::F64 => f.write_str("f64"),
            Ty::Bool => f.write_str("bool"),
            Ty::Any => f.write_str("any"),
            Ty::Fun { args, ret } => {
                f.write_str("(")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{a}")?;
                }
                write!(f, ") -> {ret}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fun_types_compare_structurally() {
        let a = Ty::fun(vec![Ty::I32, Ty::Any], Ty::Void);
        let b = Ty::fun(vec![Ty::I32, Ty::Any], Ty::Void);
        let c = Ty::fun(vec![Ty::I32], Ty::Void);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, Ty::fun(vec![Ty::I32, Ty::Any], Ty::I32));
    }

    #[test]
    fn renders_for_diagnostics() {
        assert_eq!(Ty::UI8.to_string(), "ui8");
        let t = Ty::fun(vec![Ty::F64, Ty::Bool], Ty::Any);
        assert_eq!(t.to_string(), "(f64, bool) -> any");
        assert_eq!(Ty::fun(vec![], Ty::Void).to_string(), "() -> void");
    }
}
