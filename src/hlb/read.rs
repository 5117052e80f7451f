//! Binary reader for HLB modules.
//!
//! Strict inverse of the writer: bad magic, unknown versions, unknown
//! tags, out-of-range references and truncation are all errors.

use crate::error::{Error, Result};
use crate::hlb::{FunDecl, GlobalId, Module, Opcode, RegId, Tag, MAGIC, VERSION};
use crate::types::Ty;

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn byte(&mut self) -> Result<u8> {
        let b = *self
            .buf
            .get(self.pos)
            .ok_or_else(|| Error::Read("unexpected end of input".into()))?;
        self.pos += 1;
        Ok(b)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&e| e <= self.buf.len())
            .ok_or_else(|| Error::Read("unexpected end of input".into()))?;
        let s = &self.buf[self.pos..end];
        self.pos = end;
        Ok(s)
    }

    fn vint(&mut self) -> Result<i32> {
        let b0 = self.byte()?;
        if b0 & 0x80 == 0 {
            return Ok(b0 as i32);
        }
        let neg = b0 & 0x20 != 0;
        let mag = if b0 & 0x40 == 0 {
            let b1 = self.byte()?;
            (((b0 & 0x1F) as i32) << 8) | b1 as i32
        } else {
            let b1 = self.byte()?;
            let b2 = self.byte()?;
            let b3 = self.byte()?;
            (((b0 & 0x1F) as i32) << 24) | ((b1 as i32) << 16) | ((b2 as i32) << 8) | b3 as i32
        };
        Ok(if neg { -mag } else { mag })
    }

    /// Non-negative vint, for counts and table references.
    fn index(&mut self, what: &str) -> Result<usize> {
        let i = self.vint()?;
        usize::try_from(i).map_err(|_| Error::Read(format!("negative {what} {i}")))
    }

    fn reg(&mut self) -> Result<RegId> {
        let i = self.index("register")?;
        Ok(RegId(i as u32))
    }

    fn global(&mut self) -> Result<GlobalId> {
        let i = self.index("global")?;
        Ok(GlobalId(i as u32))
    }
}

impl Module {
    pub fn from_bytes(bytes: &[u8]) -> Result<Module> {
        let mut r = Reader { buf: bytes, pos: 0 };
        if r.take(3)? != MAGIC {
            return Err(Error::Read("bad magic".into()));
        }
        let version = r.byte()?;
        if version != VERSION {
            return Err(Error::Read(format!("unsupported version {version}")));
        }
        let ntypes = r.index("type count")?;
        let nglobals = r.index("global count")?;
        let nfloats = r.index("float count")?;
        let nnatives = r.index("native count")?;
        let nfunctions = r.index("function count")?;
        let entrypoint = r.global()?;

        let mut types: Vec<Ty> = Vec::with_capacity(ntypes);
        for _ in 0..ntypes {
            let t = read_type(&mut r, &types)?;
            types.push(t);
        }
        let mut globals: Vec<Ty> = Vec::with_capacity(nglobals);
        for _ in 0..nglobals {
            globals.push(type_ref(&mut r, &types)?);
        }
        if entrypoint.0 as usize >= globals.len() {
            return Err(Error::Read(format!("entrypoint @{} out of range", entrypoint.0)));
        }

        let mut floats: Vec<f64> = Vec::with_capacity(nfloats);
        for _ in 0..nfloats {
            let raw: [u8; 8] = r.take(8)?.try_into().expect("8-byte slice");
            floats.push(f64::from_le_bytes(raw));
        }

        let mut natives: Vec<(String, GlobalId)> = Vec::with_capacity(nnatives);
        for _ in 0..nnatives {
            let len = r.byte()? as usize;
            let name = std::str::from_utf8(r.take(len)?)
                .map_err(|_| Error::Read("native name is not UTF-8".into()))?
                .to_string();
            let g = r.global()?;
            if g.0 as usize >= globals.len() {
                return Err(Error::Read(format!("native global @{} out of range", g.0)));
            }
            natives.push((name, g));
        }

        let mut functions: Vec<FunDecl> = Vec::with_capacity(nfunctions);
        for _ in 0..nfunctions {
            let findex = r.global()?;
            let nregs = r.index("register count")?;
            let ncode = r.index("opcode count")?;
            let mut regs: Vec<Ty> = Vec::with_capacity(nregs);
            for _ in 0..nregs {
                regs.push(type_ref(&mut r, &types)?);
            }
            let mut code: Vec<Opcode> = Vec::with_capacity(ncode);
            for _ in 0..ncode {
                code.push(read_opcode(&mut r)?);
            }
            functions.push(FunDecl { findex, regs, code });
        }

        if r.pos != r.buf.len() {
            return Err(Error::Read("trailing bytes after module".into()));
        }

        Ok(Module {
            version,
            entrypoint,
            globals,
            floats,
            natives,
            functions,
        })
    }
}

fn type_ref(r: &mut Reader, types: &[Ty]) -> Result<Ty> {
    let i = r.index("type ref")?;
    types
        .get(i)
        .cloned()
        .ok_or_else(|| Error::Read(format!("type ref {i} out of range")))
}

fn read_type(r: &mut Reader, seen: &[Ty]) -> Result<Ty> {
    let tag = r.byte()?;
    Ok(match tag {
        0 => Ty::Void,
        1 => Ty::UI8,
        2 => Ty::I32,
        3 => Ty::F32,
        4 => Ty::F64,
        5 => Ty::Bool,
        6 => Ty::Any,
        7 => {
            let nargs = r.byte()? as usize;
            // Function records may only reference earlier entries.
            let mut args = Vec::with_capacity(nargs);
            for _ in 0..nargs {
                args.push(type_ref(r, seen)?);
            }
            let ret = type_ref(r, seen)?;
            Ty::fun(args, ret)
        }
        _ => return Err(Error::Read(format!("unknown type tag {tag}"))),
    })
}

fn read_opcode(r: &mut Reader) -> Result<Opcode> {
    let b0 = r.byte()?;
    if b0 & 0x80 != 0 {
        // Compact binary form: tag in bits 6..1, high dst bit in bit 0.
        let tag = (b0 & 0x7F) >> 1;
        let b1 = r.byte()?;
        let dst = RegId((((b0 & 1) as u32) << 2) | ((b1 >> 6) as u32));
        let a = RegId(((b1 >> 3) & 7) as u32);
        let b = RegId((b1 & 7) as u32);
        return Ok(match tag {
            t if t == Tag::Add as u8 => Opcode::Add { dst, a, b },
            t if t == Tag::Sub as u8 => Opcode::Sub { dst, a, b },
            t if t == Tag::Eq as u8 => Opcode::Eq { dst, a, b },
            t if t == Tag::NotEq as u8 => Opcode::NotEq { dst, a, b },
            t if t == Tag::Lt as u8 => Opcode::Lt { dst, a, b },
            t if t == Tag::Gte as u8 => Opcode::Gte { dst, a, b },
            _ => return Err(Error::Read(format!("unknown compact opcode tag {tag}"))),
        });
    }
    Ok(match b0 {
        t if t == Tag::Mov as u8 => Opcode::Mov { dst: r.reg()?, src: r.reg()? },
        t if t == Tag::IntU8 as u8 => {
            let dst = r.reg()?;
            let value = r.byte()? as i32;
            Opcode::Int { dst, value }
        }
        t if t == Tag::IntI32 as u8 => {
            let dst = r.reg()?;
            let raw: [u8; 4] = r.take(4)?.try_into().expect("4-byte slice");
            Opcode::Int { dst, value: i32::from_le_bytes(raw) }
        }
        t if t == Tag::Float as u8 => {
            let dst = r.reg()?;
            let idx = r.index("float index")? as u32;
            Opcode::Float { dst, idx }
        }
        t if t == Tag::BoolTrue as u8 => Opcode::Bool { dst: r.reg()?, value: true },
        t if t == Tag::BoolFalse as u8 => Opcode::Bool { dst: r.reg()?, value: false },
        t if t == Tag::Add as u8 => Opcode::Add { dst: r.reg()?, a: r.reg()?, b: r.reg()? },
        t if t == Tag::Sub as u8 => Opcode::Sub { dst: r.reg()?, a: r.reg()?, b: r.reg()? },
        t if t == Tag::Eq as u8 => Opcode::Eq { dst: r.reg()?, a: r.reg()?, b: r.reg()? },
        t if t == Tag::NotEq as u8 => Opcode::NotEq { dst: r.reg()?, a: r.reg()?, b: r.reg()? },
        t if t == Tag::Lt as u8 => Opcode::Lt { dst: r.reg()?, a: r.reg()?, b: r.reg()? },
        t if t == Tag::Gte as u8 => Opcode::Gte { dst: r.reg()?, a: r.reg()?, b: r.reg()? },
        t if t == Tag::Incr as u8 => Opcode::Incr { dst: r.reg()? },
        t if t == Tag::Decr as u8 => Opcode::Decr { dst: r.reg()? },
        t if t == Tag::Call0 as u8 => Opcode::Call0 { dst: r.reg()?, fun: r.global()? },
        t if t == Tag::Call1 as u8 => {
            Opcode::Call1 { dst: r.reg()?, fun: r.global()?, arg0: r.reg()? }
        }
        t if t == Tag::Call2 as u8 => Opcode::Call2 {
            dst: r.reg()?,
            fun: r.global()?,
            arg0: r.reg()?,
            arg1: r.reg()?,
        },
        t if t == Tag::Call3 as u8 => Opcode::Call3 {
            dst: r.reg()?,
            fun: r.global()?,
            arg0: r.reg()?,
            arg1: r.reg()?,
            arg2: r.reg()?,
        },
        t if t == Tag::CallN as u8 => {
            let dst = r.reg()?;
            let fun = r.reg()?;
            let n = r.byte()? as usize;
            let mut args = Vec::with_capacity(n);
            for _ in 0..n {
                args.push(r.reg()?);
            }
            Opcode::CallN { dst, fun, args }
        }
        t if t == Tag::GetGlobal as u8 => Opcode::GetGlobal { dst: r.reg()?, global: r.global()? },
        t if t == Tag::SetGlobal as u8 => Opcode::SetGlobal { global: r.global()?, src: r.reg()? },
        t if t == Tag::Ret as u8 => Opcode::Ret { reg: r.reg()? },
        t if t == Tag::JTrue as u8 => Opcode::JTrue { cond: r.reg()?, delta: r.vint()? },
        t if t == Tag::JFalse as u8 => Opcode::JFalse { cond: r.reg()?, delta: r.vint()? },
        t if t == Tag::JNull as u8 => Opcode::JNull { reg: r.reg()?, delta: r.vint()? },
        t if t == Tag::JNotNull as u8 => Opcode::JNotNull { reg: r.reg()?, delta: r.vint()? },
        t if t == Tag::JAlways as u8 => Opcode::JAlways { delta: r.vint()? },
        t if t == Tag::ToAny as u8 => Opcode::ToAny { dst: r.reg()?, src: r.reg()? },
        _ => return Err(Error::Read(format!("unknown opcode tag {b0}"))),
    })
}
