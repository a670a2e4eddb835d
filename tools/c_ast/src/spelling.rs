//! Parsers for the textual fields of clang's JSON dump: type spellings, operator and cast names,
//! and literal values.

use crate::ImportError;
use astclone_ir::ast::{
    BinOp, CastKind, CharKind, FloatSemantics, PredefinedIdent, PrimType, QualType, Qualifiers,
    StringKind, Type, UnaryOp, UnaryTraitKind, ValueKind,
};

/// Parses a `qualType` spelling. Builtin, pointer, reference and constant-array forms are
/// understood; anything else is kept whole as a `Typedef` of the spelling.
pub fn parse_type(spelling: &str) -> QualType {
    let s = spelling.trim();
    if s.is_empty() {
        return QualType::null();
    }
    // function and pointer-to-array declarators
    if s.contains('(') {
        return opaque(s);
    }
    if let Some((stripped, open)) = s.strip_suffix(']').and_then(|t| Some((t, t.rfind('[')?))) {
        let elem = parse_type(&stripped[..open]);
        return match stripped[open + 1..].trim() {
            "" => QualType::new(Type::IncompleteArray { elem }),
            dim => match dim.parse::<u64>() {
                Ok(size) => QualType::new(Type::ConstantArray { elem, size }),
                Err(_) => opaque(s),
            },
        };
    }
    if let Some(inner) = s.strip_suffix("&&") {
        return QualType::new(Type::RValueReference(parse_type(inner)));
    }
    if let Some(inner) = s.strip_suffix('&') {
        return QualType::new(Type::LValueReference(parse_type(inner)));
    }
    if let Some(star) = s.rfind('*') {
        let Some(quals) = qualifiers(&s[star + 1..]) else {
            return opaque(s);
        };
        return QualType::with_quals(Type::Pointer(parse_type(&s[..star])), quals);
    }

    let mut quals = Qualifiers::default();
    let mut words = Vec::new();
    for word in s.split_whitespace() {
        match word {
            "const" => quals.is_const = true,
            "volatile" => quals.is_volatile = true,
            "restrict" | "__restrict" => quals.is_restrict = true,
            _ => words.push(word),
        }
    }
    QualType::with_quals(base_type(&words.join(" ")), quals)
}

fn opaque(s: &str) -> QualType {
    QualType::new(Type::Typedef(s.to_string()))
}

/// Qualifier words following a `*`; None if anything else is there.
fn qualifiers(s: &str) -> Option<Qualifiers> {
    let mut quals = Qualifiers::default();
    for word in s.split_whitespace() {
        match word {
            "const" => quals.is_const = true,
            "volatile" => quals.is_volatile = true,
            "restrict" | "__restrict" => quals.is_restrict = true,
            _ => return None,
        }
    }
    Some(quals)
}

fn base_type(name: &str) -> Type {
    let prim = match name {
        "void" => return Type::Void,
        "nullptr_t" | "std::nullptr_t" => return Type::NullPtr,
        "_Bool" | "bool" => PrimType::Bool,
        "char" => PrimType::Char,
        "signed char" => PrimType::SChar,
        "unsigned char" => PrimType::UChar,
        "short" | "short int" | "signed short" => PrimType::Short,
        "unsigned short" | "unsigned short int" => PrimType::UShort,
        "int" | "signed" | "signed int" => PrimType::Int,
        "unsigned" | "unsigned int" => PrimType::UInt,
        "long" | "long int" | "signed long" => PrimType::Long,
        "unsigned long" | "unsigned long int" => PrimType::ULong,
        "long long" | "long long int" | "signed long long" => PrimType::LongLong,
        "unsigned long long" | "unsigned long long int" => PrimType::ULongLong,
        "__int128" => PrimType::Int128,
        "unsigned __int128" => PrimType::UInt128,
        "wchar_t" => PrimType::WChar,
        "char16_t" => PrimType::Char16,
        "char32_t" => PrimType::Char32,
        "float" => PrimType::Float,
        "double" => PrimType::Double,
        "long double" => PrimType::LongDouble,
        "_Float16" | "__fp16" => PrimType::Half,
        "__bf16" => PrimType::BFloat16,
        _ => {
            if let Some(complex) = name.strip_prefix("_Complex ") {
                return match base_type(complex) {
                    Type::Prim(p) => Type::Complex(p),
                    _ => Type::Typedef(name.to_string()),
                };
            }
            if let Some(tag) = name.strip_prefix("struct ").or(name.strip_prefix("union ")) {
                return Type::Record(tag.to_string());
            }
            if let Some(tag) = name.strip_prefix("enum ") {
                return Type::Enum(tag.to_string());
            }
            return Type::Typedef(name.to_string());
        }
    };
    Type::Prim(prim)
}

pub fn value_kind(category: Option<&str>) -> ValueKind {
    match category {
        Some("lvalue") => ValueKind::LValue,
        Some("xvalue") => ValueKind::XValue,
        _ => ValueKind::PRValue,
    }
}

pub fn binary_op(opcode: &str) -> Result<BinOp, ImportError> {
    Ok(match opcode {
        ".*" => BinOp::PtrMemD,
        "->*" => BinOp::PtrMemI,
        "*" => BinOp::Mult,
        "/" => BinOp::Div,
        "%" => BinOp::Mod,
        "+" => BinOp::Add,
        "-" => BinOp::Sub,
        "<<" => BinOp::ShiftL,
        ">>" => BinOp::ShiftR,
        "<=>" => BinOp::Cmp,
        "<" => BinOp::Lt,
        ">" => BinOp::Gt,
        "<=" => BinOp::Le,
        ">=" => BinOp::Ge,
        "==" => BinOp::Eq,
        "!=" => BinOp::Neq,
        "&" => BinOp::BitAnd,
        "^" => BinOp::BitXor,
        "|" => BinOp::BitOr,
        "&&" => BinOp::And,
        "||" => BinOp::Or,
        "+=" => BinOp::AssignAdd,
        "-=" => BinOp::AssignSub,
        "*=" => BinOp::AssignMult,
        "/=" => BinOp::AssignDiv,
        "%=" => BinOp::AssignMod,
        "^=" => BinOp::AssignBitXor,
        "<<=" => BinOp::AssignShiftL,
        ">>=" => BinOp::AssignShiftR,
        "|=" => BinOp::AssignBitOr,
        "&=" => BinOp::AssignBitAnd,
        "=" => BinOp::Assign,
        "," => BinOp::Comma,
        _ => return Err(malformed("binary opcode", opcode)),
    })
}

pub fn unary_op(opcode: &str, postfix: bool) -> Result<UnaryOp, ImportError> {
    Ok(match (opcode, postfix) {
        ("&", _) => UnaryOp::AddressOf,
        ("*", _) => UnaryOp::Deref,
        ("+", _) => UnaryOp::Plus,
        ("-", _) => UnaryOp::Minus,
        ("++", true) => UnaryOp::PostInc,
        ("++", false) => UnaryOp::PreInc,
        ("--", true) => UnaryOp::PostDec,
        ("--", false) => UnaryOp::PreDec,
        ("~", _) => UnaryOp::BitNot,
        ("!", _) => UnaryOp::Not,
        ("__real", _) => UnaryOp::Real,
        ("__imag", _) => UnaryOp::Imag,
        ("__extension__", _) => UnaryOp::Extension,
        ("co_await", _) => UnaryOp::Coawait,
        _ => return Err(malformed("unary opcode", opcode)),
    })
}

pub fn cast_kind(name: &str) -> CastKind {
    match name {
        "Dependent" => CastKind::Dependent,
        "BitCast" => CastKind::BitCast,
        "LValueToRValue" => CastKind::LValueToRValue,
        "NoOp" => CastKind::NoOp,
        "BaseToDerived" => CastKind::BaseToDerived,
        "DerivedToBase" | "UncheckedDerivedToBase" => CastKind::DerivedToBase,
        "ArrayToPointerDecay" => CastKind::ArrayToPointerDecay,
        "FunctionToPointerDecay" => CastKind::FunctionToPointerDecay,
        "NullToPointer" => CastKind::NullToPointer,
        "ConstructorConversion" => CastKind::ConstructorConversion,
        "UserDefinedConversion" => CastKind::UserDefinedConversion,
        "IntegralCast" => CastKind::IntegralCast,
        "IntegralToBoolean" => CastKind::IntegralToBoolean,
        "IntegralToFloating" => CastKind::IntegralToFloating,
        "IntegralToPointer" => CastKind::IntegralToPointer,
        "PointerToIntegral" => CastKind::PointerToIntegral,
        "PointerToBoolean" => CastKind::PointerToBoolean,
        "FloatingToIntegral" => CastKind::FloatingToIntegral,
        "FloatingToBoolean" => CastKind::FloatingToBoolean,
        "FloatingCast" => CastKind::FloatingCast,
        "ToVoid" => CastKind::ToVoid,
        _ => CastKind::Other,
    }
}

pub fn trait_kind(name: &str) -> Result<UnaryTraitKind, ImportError> {
    Ok(match name {
        "sizeof" => UnaryTraitKind::SizeOf,
        "alignof" | "_Alignof" => UnaryTraitKind::AlignOf,
        "__alignof" => UnaryTraitKind::PreferredAlignOf,
        "vec_step" => UnaryTraitKind::VecStep,
        _ => return Err(malformed("trait", name)),
    })
}

pub fn predefined_ident(name: &str) -> Result<PredefinedIdent, ImportError> {
    Ok(match name {
        "__func__" => PredefinedIdent::Func,
        "__FUNCTION__" => PredefinedIdent::Function,
        "__FUNCDNAME__" => PredefinedIdent::FuncDName,
        "__FUNCSIG__" => PredefinedIdent::FuncSig,
        "__PRETTY_FUNCTION__" => PredefinedIdent::PrettyFunction,
        _ => return Err(malformed("predefined identifier", name)),
    })
}

pub fn float_semantics(ty: &QualType) -> FloatSemantics {
    match ty.typ.as_deref() {
        Some(Type::Prim(PrimType::Half | PrimType::BFloat16)) => FloatSemantics::IeeeHalf,
        Some(Type::Prim(PrimType::Float)) => FloatSemantics::IeeeSingle,
        Some(Type::Prim(PrimType::LongDouble)) => FloatSemantics::X87DoubleExtended,
        _ => FloatSemantics::IeeeDouble,
    }
}

pub fn char_kind(ty: &QualType) -> CharKind {
    match ty.typ.as_deref() {
        Some(Type::Prim(PrimType::WChar)) => CharKind::Wide,
        Some(Type::Prim(PrimType::Char16)) => CharKind::Utf16,
        Some(Type::Prim(PrimType::Char32)) => CharKind::Utf32,
        Some(Type::Typedef(name)) if name == "char8_t" => CharKind::Utf8,
        _ => CharKind::Ascii,
    }
}

/// Decodes a string literal as clang spells it (`"a\n"`, `L"wide"`, `u8"..."`) into its kind
/// and bytes.
pub fn string_literal(spelling: &str) -> Result<(StringKind, Vec<u8>), ImportError> {
    let (kind, quoted) = if let Some(rest) = spelling.strip_prefix("u8") {
        (StringKind::Utf8, rest)
    } else if let Some(rest) = spelling.strip_prefix('u') {
        (StringKind::Utf16, rest)
    } else if let Some(rest) = spelling.strip_prefix('U') {
        (StringKind::Utf32, rest)
    } else if let Some(rest) = spelling.strip_prefix('L') {
        (StringKind::Wide, rest)
    } else {
        (StringKind::Ordinary, spelling)
    };
    let body = quoted
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| malformed("string literal", spelling))?;
    Ok((kind, unescape(body).ok_or_else(|| malformed("string literal", spelling))?))
}

fn unescape(body: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(body.len());
    let bytes = body.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        let escape = *bytes.get(i + 1)?;
        i += 2;
        match escape {
            b'n' => out.push(b'\n'),
            b't' => out.push(b'\t'),
            b'r' => out.push(b'\r'),
            b'a' => out.push(0x07),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'v' => out.push(0x0b),
            b'\\' | b'"' | b'\'' | b'?' => out.push(escape),
            b'x' => {
                let digits = bytes[i..].iter().take_while(|b| b.is_ascii_hexdigit()).count();
                let value = u8::from_str_radix(body.get(i..i + digits)?, 16).ok()?;
                out.push(value);
                i += digits;
            }
            b'0'..=b'7' => {
                let start = i - 1;
                let digits = 1 + bytes[i..]
                    .iter()
                    .take(2)
                    .take_while(|b| (b'0'..=b'7').contains(*b))
                    .count();
                let value = u8::from_str_radix(body.get(start..start + digits)?, 8).ok()?;
                out.push(value);
                i = start + digits;
            }
            _ => return None,
        }
    }
    Some(out)
}

fn malformed(what: &'static str, text: &str) -> ImportError {
    ImportError::Malformed {
        what,
        text: text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_and_derived_types() {
        assert_eq!(parse_type("int"), QualType::prim(PrimType::Int));
        assert_eq!(
            parse_type("unsigned long"),
            QualType::prim(PrimType::ULong)
        );
        assert_eq!(parse_type("const char *"), QualType::const_char_ptr());
        assert_eq!(parse_type("const char[6]"), QualType::string_literal(5));
        assert_eq!(
            parse_type("double &"),
            QualType::lvalue_ref_to(QualType::prim(PrimType::Double))
        );
        assert_eq!(
            parse_type("int[]"),
            QualType::new(Type::IncompleteArray {
                elem: QualType::prim(PrimType::Int)
            })
        );
        assert_eq!(parse_type("struct point"), QualType::new(Type::Record("point".into())));
        assert!(parse_type("").is_null());
    }

    #[test]
    fn qualifiers_after_the_star_bind_to_the_pointer() {
        let ty = parse_type("char *const");
        assert!(ty.quals.is_const);
        let Some(Type::Pointer(pointee)) = ty.typ.as_deref() else {
            panic!("not a pointer: {ty:?}");
        };
        assert_eq!(*pointee, QualType::prim(PrimType::Char));
    }

    #[test]
    fn unparsed_spellings_are_kept() {
        assert_eq!(
            parse_type("int (*)(int)"),
            QualType::new(Type::Typedef("int (*)(int)".into()))
        );
        assert_eq!(
            parse_type("double[n]"),
            QualType::new(Type::Typedef("double[n]".into()))
        );
        assert_eq!(parse_type("size_t"), QualType::new(Type::Typedef("size_t".into())));
    }

    #[test]
    fn escapes() {
        assert_eq!(
            string_literal(r#""a\tb\n""#).unwrap(),
            (StringKind::Ordinary, b"a\tb\n".to_vec())
        );
        assert_eq!(
            string_literal(r#""\x41\101\0""#).unwrap(),
            (StringKind::Ordinary, vec![b'A', b'A', 0])
        );
        assert_eq!(string_literal(r#"L"w""#).unwrap(), (StringKind::Wide, b"w".to_vec()));
        assert!(string_literal("abc").is_err());
        assert!(string_literal(r#""\q""#).is_err());
    }

    #[test]
    fn opcodes() {
        assert_eq!(binary_op("<<=").unwrap(), BinOp::AssignShiftL);
        assert_eq!(unary_op("++", true).unwrap(), UnaryOp::PostInc);
        assert_eq!(unary_op("++", false).unwrap(), UnaryOp::PreInc);
        assert!(binary_op("??").is_err());
        assert_eq!(cast_kind("AtomicToNonAtomic"), CastKind::Other);
    }
}
