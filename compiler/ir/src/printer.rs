//! Prints functions in a GIMPLE-like textual form, for logs and tests.
use std::fmt::{self, Write};

use crate::{Function, Seq, Stmt, TryKind};

const INDENT: usize = 2;

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let ty = self.decl().ty();
        write!(f, "{} {} (", ty.ret(), self.name())?;
        for (i, param) in ty.params().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", param)?;
        }
        f.write_char(')')?;
        if ty.is_nothrow() {
            f.write_str(" noexcept")?;
        }
        f.write_char('\n')?;
        if let Some(personality) = self.personality() {
            writeln!(f, "[personality: {}]", personality.name())?;
        }
        f.write_str("{\n")?;
        write_seq(f, self.body(), INDENT)?;
        f.write_str("}\n")
    }
}

impl fmt::Display for Seq {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_seq(f, self, 0)
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_stmt(f, self, 0)
    }
}

fn write_seq(f: &mut fmt::Formatter, seq: &Seq, indent: usize) -> fmt::Result {
    for stmt in seq.iter() {
        write_stmt(f, stmt, indent)?;
    }
    Ok(())
}

fn write_block(f: &mut fmt::Formatter, seq: &Seq, indent: usize) -> fmt::Result {
    writeln!(f, "{:indent$}{{", "", indent = indent + INDENT)?;
    write_seq(f, seq, indent + 2 * INDENT)?;
    writeln!(f, "{:indent$}}}", "", indent = indent + INDENT)
}

fn write_stmt(f: &mut fmt::Formatter, stmt: &Stmt, indent: usize) -> fmt::Result {
    match stmt {
        Stmt::Call(call) => {
            write!(f, "{:indent$}", "", indent = indent)?;
            if let Some(lhs) = call.lhs.as_ref() {
                write!(f, "{} = ", lhs)?;
            }
            write!(f, "{} (", &call.callee)?;
            for (i, arg) in call.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", arg)?;
            }
            f.write_str(");\n")
        }
        Stmt::Try(region) => {
            writeln!(f, "{:indent$}try", "", indent = indent)?;
            write_block(f, &region.eval, indent)?;
            let kind = match region.kind {
                TryKind::Catch => "catch",
                TryKind::Finally => "finally",
            };
            writeln!(f, "{:indent$}{}", "", kind, indent = indent)?;
            write_block(f, &region.cleanup, indent)
        }
        Stmt::Catch(catch) => {
            write!(f, "{:indent$}catch <", "", indent = indent)?;
            for (i, ty) in catch.types.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", ty)?;
            }
            f.write_str(">\n")?;
            write_block(f, &catch.handler, indent)
        }
        Stmt::MustNotThrow(mnt) => writeln!(
            f,
            "{:indent$}<<<eh_must_not_throw ({})>>>",
            "",
            mnt.fault.name(),
            indent = indent
        ),
        Stmt::Bind(seq) => {
            writeln!(f, "{:indent$}{{", "", indent = indent)?;
            write_seq(f, seq, indent + INDENT)?;
            writeln!(f, "{:indent$}}}", "", indent = indent)
        }
        Stmt::Return(None) => writeln!(f, "{:indent$}return;", "", indent = indent),
        Stmt::Return(Some(value)) => {
            writeln!(f, "{:indent$}return {};", "", value, indent = indent)
        }
    }
}
