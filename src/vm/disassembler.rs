//! Bytecode disassembler for debug output.

use super::chunk::Chunk;
use super::opcode::{Op, TypeRef};

/// Disassemble a chunk to a human-readable listing, one instruction per line.
pub fn disassemble(chunk: &Chunk) -> String {
    let mut out = String::new();
    let mut previous_line = None;

    for (offset, (op, span)) in chunk.iter().enumerate() {
        let location = if previous_line == Some(span.line) {
            "     |".to_string()
        } else {
            format!("{:>6}", format!("{}:{}", span.line, span.column))
        };
        previous_line = Some(span.line);

        out.push_str(&format!("{:04} {} ", offset, location));
        disassemble_op(op, &mut out);
        out.push('\n');
    }
    out
}

fn disassemble_op(op: &Op, out: &mut String) {
    match op {
        Op::LoadName(name) => out.push_str(&format!("LOAD_NAME       {}", name)),
        Op::LoadConst(literal) => out.push_str(&format!("LOAD_CONST      {}", literal)),
        Op::LoadValue => out.push_str("LOAD_VALUE"),
        Op::ResolveType {
            kind,
            array,
            optional,
        } => {
            let kind = match kind {
                TypeRef::User => "user",
                builtin => builtin.builtin_name().unwrap_or("?"),
            };
            out.push_str(&format!(
                "RESOLVE_TYPE    {}{}{}",
                kind,
                if *array { " []" } else { "" },
                if *optional { " ?" } else { "" }
            ));
        }
        Op::MakeField(name) => out.push_str(&format!("MAKE_FIELD      {}", name)),
        Op::MakeObjectDef(count) => out.push_str(&format!("MAKE_OBJECT_DEF {}", count)),
        Op::BindType => out.push_str("BIND_TYPE"),
        Op::Store { has_value } => out.push_str(if *has_value {
            "STORE           value"
        } else {
            "STORE           default"
        }),
        Op::NewObject => out.push_str("NEW_OBJECT"),
        Op::SetField => out.push_str("SET_FIELD"),
        Op::FinalizeInitialize => out.push_str("FINALIZE_INIT"),
        Op::OpenSection => out.push_str("OPEN_SECTION"),
        Op::CloseSection => out.push_str("CLOSE_SECTION"),
        Op::LoadMember => out.push_str("LOAD_MEMBER"),
        Op::MakeCall(argc) => out.push_str(&format!("MAKE_CALL       {}", argc)),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ast::Literal;
    use crate::span::Span;

    #[test]
    fn test_listing() {
        let mut chunk = Chunk::new();
        chunk.emit(Op::LoadName("int".to_string()), Span::new(7, 10, 1, 8));
        chunk.emit(
            Op::ResolveType {
                kind: TypeRef::Integer,
                array: true,
                optional: false,
            },
            Span::new(7, 10, 1, 8),
        );
        chunk.emit(Op::LoadConst(Literal::String("a".to_string())), Span::new(20, 23, 2, 3));
        chunk.emit(Op::Store { has_value: true }, Span::new(20, 23, 2, 3));

        assert_eq!(
            disassemble(&chunk),
            "0000    1:8 LOAD_NAME       int\n\
             0001      | RESOLVE_TYPE    int []\n\
             0002    2:3 LOAD_CONST      \"a\"\n\
             0003      | STORE           value\n"
        );
    }
}
