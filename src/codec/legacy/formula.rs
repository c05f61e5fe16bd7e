//! BIFF8 Formula Compiler
//!
//! 数式テキストを字句解析し、再帰下降でBIFF8のPtg列（逆ポーランド順）に変換する。
//!
//! 対応する要素:
//! - 数値・文字列・論理値・エラー値のリテラル
//! - 同一シート内のセル参照（`A1`, `$B$2`）と範囲参照（`A1:C3`）
//! - 算術・比較・連結演算子、単項の`+`/`-`、後置の`%`
//! - BIFF8の関数表に含まれる関数
//!
//! 他シートへの参照と名前定義は扱わない。

use crate::error::{Result, XlsBridgeError};

/// BIFF8で扱える数式トークン列の最大長
const MAX_TOKEN_BYTES: usize = 1800;

/// 可変長引数の関数が受け付ける引数の最大数
const MAX_VAR_ARGS: u8 = 30;

const LEGACY_MAX_ROW: u32 = 65_536;
const LEGACY_MAX_COLUMN: u16 = 256;

const PTG_ADD: u8 = 0x03;
const PTG_SUB: u8 = 0x04;
const PTG_MUL: u8 = 0x05;
const PTG_DIV: u8 = 0x06;
const PTG_POWER: u8 = 0x07;
const PTG_CONCAT: u8 = 0x08;
const PTG_LT: u8 = 0x09;
const PTG_LE: u8 = 0x0A;
const PTG_EQ: u8 = 0x0B;
const PTG_GE: u8 = 0x0C;
const PTG_GT: u8 = 0x0D;
const PTG_NE: u8 = 0x0E;
const PTG_UPLUS: u8 = 0x12;
const PTG_UMINUS: u8 = 0x13;
const PTG_PERCENT: u8 = 0x14;
const PTG_PAREN: u8 = 0x15;
const PTG_MISS_ARG: u8 = 0x16;
const PTG_STR: u8 = 0x17;
const PTG_ERR: u8 = 0x1C;
const PTG_BOOL: u8 = 0x1D;
const PTG_INT: u8 = 0x1E;
const PTG_NUM: u8 = 0x1F;
const PTG_FUNC: u8 = 0x41;
const PTG_FUNC_VAR: u8 = 0x42;
const PTG_REF: u8 = 0x24;
const PTG_AREA: u8 = 0x25;

/// 関数表の項目
struct FunctionInfo {
    name: &'static str,
    index: u16,
    min_args: u8,
    max_args: u8,
    /// 固定長引数（PtgFunc）かどうか
    fixed: bool,
}

const fn fixed(name: &'static str, index: u16, args: u8) -> FunctionInfo {
    FunctionInfo {
        name,
        index,
        min_args: args,
        max_args: args,
        fixed: true,
    }
}

const fn var(name: &'static str, index: u16, min_args: u8, max_args: u8) -> FunctionInfo {
    FunctionInfo {
        name,
        index,
        min_args,
        max_args,
        fixed: false,
    }
}

const FUNCTIONS: &[FunctionInfo] = &[
    var("COUNT", 0, 0, MAX_VAR_ARGS),
    var("IF", 1, 2, 3),
    fixed("ISNA", 2, 1),
    fixed("ISERROR", 3, 1),
    var("SUM", 4, 0, MAX_VAR_ARGS),
    var("AVERAGE", 5, 1, MAX_VAR_ARGS),
    var("MIN", 6, 1, MAX_VAR_ARGS),
    var("MAX", 7, 1, MAX_VAR_ARGS),
    var("ROW", 8, 0, 1),
    var("COLUMN", 9, 0, 1),
    fixed("NA", 10, 0),
    var("NPV", 11, 2, MAX_VAR_ARGS),
    var("STDEV", 12, 1, MAX_VAR_ARGS),
    var("DOLLAR", 13, 1, 2),
    var("FIXED", 14, 1, 3),
    fixed("SIN", 15, 1),
    fixed("COS", 16, 1),
    fixed("TAN", 17, 1),
    fixed("ATAN", 18, 1),
    fixed("PI", 19, 0),
    fixed("SQRT", 20, 1),
    fixed("EXP", 21, 1),
    fixed("LN", 22, 1),
    fixed("LOG10", 23, 1),
    fixed("ABS", 24, 1),
    fixed("INT", 25, 1),
    fixed("SIGN", 26, 1),
    fixed("ROUND", 27, 2),
    var("LOOKUP", 28, 2, 3),
    var("INDEX", 29, 2, 4),
    fixed("REPT", 30, 2),
    fixed("MID", 31, 3),
    fixed("LEN", 32, 1),
    fixed("VALUE", 33, 1),
    fixed("TRUE", 34, 0),
    fixed("FALSE", 35, 0),
    var("AND", 36, 1, MAX_VAR_ARGS),
    var("OR", 37, 1, MAX_VAR_ARGS),
    fixed("NOT", 38, 1),
    fixed("MOD", 39, 2),
    fixed("TEXT", 48, 2),
    var("MATCH", 64, 2, 3),
    fixed("DATE", 65, 3),
    fixed("TIME", 66, 3),
    fixed("DAY", 67, 1),
    fixed("MONTH", 68, 1),
    fixed("YEAR", 69, 1),
    var("WEEKDAY", 70, 1, 2),
    fixed("HOUR", 71, 1),
    fixed("MINUTE", 72, 1),
    fixed("SECOND", 73, 1),
    fixed("NOW", 74, 0),
    var("SEARCH", 82, 2, 3),
    var("HLOOKUP", 101, 3, 4),
    var("VLOOKUP", 102, 3, 4),
    fixed("LOWER", 112, 1),
    fixed("UPPER", 113, 1),
    fixed("PROPER", 114, 1),
    var("LEFT", 115, 1, 2),
    var("RIGHT", 116, 1, 2),
    fixed("EXACT", 117, 2),
    fixed("TRIM", 118, 1),
    fixed("REPLACE", 119, 4),
    var("SUBSTITUTE", 120, 3, 4),
    var("FIND", 124, 2, 3),
    fixed("ISTEXT", 127, 1),
    fixed("ISNUMBER", 128, 1),
    fixed("ISBLANK", 129, 1),
    var("COUNTA", 169, 0, MAX_VAR_ARGS),
    var("PRODUCT", 183, 0, MAX_VAR_ARGS),
    fixed("ROUNDUP", 212, 2),
    fixed("ROUNDDOWN", 213, 2),
    fixed("TODAY", 221, 0),
    var("MEDIAN", 227, 1, MAX_VAR_ARGS),
    fixed("FLOOR", 285, 2),
    fixed("CEILING", 288, 2),
    var("CONCATENATE", 336, 0, MAX_VAR_ARGS),
    fixed("POWER", 337, 2),
    var("SUMIF", 345, 2, 3),
    fixed("COUNTIF", 346, 2),
];

fn lookup_function(name: &str) -> Option<&'static FunctionInfo> {
    FUNCTIONS.iter().find(|f| f.name.eq_ignore_ascii_case(name))
}

const ERROR_VALUES: &[(&str, u8)] = &[
    ("#NULL!", 0x00),
    ("#DIV/0!", 0x07),
    ("#VALUE!", 0x0F),
    ("#REF!", 0x17),
    ("#NAME?", 0x1D),
    ("#NUM!", 0x24),
    ("#N/A", 0x2A),
];

/// エラー値のテキストに対応するBIFF8のエラーコード
pub(super) fn error_code(text: &str) -> Option<u8> {
    let text = text.trim();
    ERROR_VALUES
        .iter()
        .find(|(literal, _)| literal.eq_ignore_ascii_case(text))
        .map(|(_, code)| *code)
}

/// 数式テキストをPtg列にコンパイルする
///
/// # 引数
///
/// * `text` - 先頭の`=`を除いた数式テキスト
///
/// # 戻り値
///
/// * `Ok(Vec<u8>)` - FORMULAレコードに格納するトークン列
/// * `Err(XlsBridgeError::InvalidFormula)` - BIFF8で表現できない数式の場合
pub(super) fn compile(text: &str) -> Result<Vec<u8>> {
    let invalid = |message: String| XlsBridgeError::InvalidFormula {
        formula: text.to_string(),
        message,
    };

    let tokens = tokenize(text).map_err(invalid)?;
    if tokens.is_empty() {
        return Err(invalid("formula is empty".to_string()));
    }
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        out: Vec::new(),
    };
    parser.expression().map_err(invalid)?;
    if let Some(token) = parser.peek() {
        return Err(invalid(format!("unexpected {:?}", token)));
    }
    if parser.out.len() > MAX_TOKEN_BYTES {
        return Err(invalid(format!(
            "formula is too long ({} token bytes)",
            parser.out.len()
        )));
    }
    Ok(parser.out)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Text(String),
    Error(u8),
    /// 識別子（関数名・セル参照・論理値）
    Name(String),
    Op(&'static str),
    LParen,
    RParen,
    Comma,
    Colon,
}

fn tokenize(text: &str) -> std::result::Result<Vec<Token>, String> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                // 指数表記
                if i < chars.len() && matches!(chars[i], 'e' | 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && matches!(chars[j], '+' | '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        i = j;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let literal: String = chars[start..i].iter().collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| format!("invalid number '{}'", literal))?;
                tokens.push(Token::Number(value));
            }
            '"' => {
                let mut value = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        None => return Err("unterminated string literal".to_string()),
                        Some('"') if chars.get(i + 1) == Some(&'"') => {
                            value.push('"');
                            i += 2;
                        }
                        Some('"') => {
                            i += 1;
                            break;
                        }
                        Some(&ch) => {
                            value.push(ch);
                            i += 1;
                        }
                    }
                }
                tokens.push(Token::Text(value));
            }
            '#' => {
                let rest: String = chars[i..].iter().take(7).collect::<String>().to_ascii_uppercase();
                let (literal, code) = ERROR_VALUES
                    .iter()
                    .find(|(literal, _)| rest.starts_with(literal))
                    .ok_or_else(|| format!("unknown error value '{}'", rest))?;
                tokens.push(Token::Error(*code));
                i += literal.len();
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            ':' => {
                tokens.push(Token::Colon);
                i += 1;
            }
            '<' | '>' => {
                let next = chars.get(i + 1).copied();
                let op = match (c, next) {
                    ('<', Some('=')) => "<=",
                    ('<', Some('>')) => "<>",
                    ('>', Some('=')) => ">=",
                    ('<', _) => "<",
                    _ => ">",
                };
                i += op.len();
                tokens.push(Token::Op(op));
            }
            '+' | '-' | '*' | '/' | '^' | '&' | '=' | '%' => {
                let op = match c {
                    '+' => "+",
                    '-' => "-",
                    '*' => "*",
                    '/' => "/",
                    '^' => "^",
                    '&' => "&",
                    '=' => "=",
                    _ => "%",
                };
                tokens.push(Token::Op(op));
                i += 1;
            }
            c if c.is_alphabetic() || c == '$' || c == '_' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_alphanumeric() || matches!(chars[i], '$' | '_' | '.'))
                {
                    i += 1;
                }
                if chars.get(i) == Some(&'!') {
                    return Err("references to other sheets are not supported".to_string());
                }
                tokens.push(Token::Name(chars[start..i].iter().collect()));
            }
            '!' | '\'' => return Err("references to other sheets are not supported".to_string()),
            other => return Err(format!("unexpected character '{}'", other)),
        }
    }
    Ok(tokens)
}

/// セル参照（0始まり、相対参照フラグ付き）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellRef {
    row: u16,
    column: u16,
    row_relative: bool,
    column_relative: bool,
}

impl CellRef {
    /// 列フィールド（下位14ビットが列、ビット14が列の相対、ビット15が行の相対）
    fn column_field(self) -> u16 {
        let mut field = self.column & 0x3FFF;
        if self.column_relative {
            field |= 0x4000;
        }
        if self.row_relative {
            field |= 0x8000;
        }
        field
    }
}

fn parse_cell_ref(name: &str) -> Option<CellRef> {
    let mut rest = name;
    let column_relative = !rest.starts_with('$');
    rest = rest.trim_start_matches('$');

    let letters = rest.chars().take_while(|c| c.is_ascii_alphabetic()).count();
    if letters == 0 || letters > 3 {
        return None;
    }
    let (column_text, tail) = rest.split_at(letters);
    let row_relative = !tail.starts_with('$');
    let digits = tail.strip_prefix('$').unwrap_or(tail);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let column = column_text
        .chars()
        .try_fold(0u32, |acc, c| {
            let value = u32::from(c.to_ascii_uppercase()) - u32::from('A') + 1;
            acc.checked_mul(26)?.checked_add(value)
        })?
        .checked_sub(1)?;
    let row = digits.parse::<u32>().ok()?.checked_sub(1)?;
    if column >= u32::from(LEGACY_MAX_COLUMN) || row >= LEGACY_MAX_ROW {
        return None;
    }

    Some(CellRef {
        row: u16::try_from(row).ok()?,
        column: u16::try_from(column).ok()?,
        row_relative,
        column_relative,
    })
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    out: Vec<u8>,
}

type ParseResult = std::result::Result<(), String>;

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn peek_op(&self, ops: &[&'static str]) -> Option<&'static str> {
        match self.peek() {
            Some(Token::Op(op)) if ops.contains(op) => Some(op),
            _ => None,
        }
    }

    /// 左結合の二項演算子の層
    fn binary(
        &mut self,
        ops: &[(&'static str, u8)],
        operand: fn(&mut Self) -> ParseResult,
    ) -> ParseResult {
        operand(self)?;
        let names: Vec<&'static str> = ops.iter().map(|(name, _)| *name).collect();
        while let Some(op) = self.peek_op(&names) {
            self.pos += 1;
            operand(self)?;
            if let Some((_, ptg)) = ops.iter().find(|(name, _)| *name == op) {
                self.out.push(*ptg);
            }
        }
        Ok(())
    }

    fn expression(&mut self) -> ParseResult {
        self.binary(
            &[
                ("=", PTG_EQ),
                ("<>", PTG_NE),
                ("<", PTG_LT),
                ("<=", PTG_LE),
                (">", PTG_GT),
                (">=", PTG_GE),
            ],
            Self::concatenation,
        )
    }

    fn concatenation(&mut self) -> ParseResult {
        self.binary(&[("&", PTG_CONCAT)], Self::additive)
    }

    fn additive(&mut self) -> ParseResult {
        self.binary(&[("+", PTG_ADD), ("-", PTG_SUB)], Self::multiplicative)
    }

    fn multiplicative(&mut self) -> ParseResult {
        self.binary(&[("*", PTG_MUL), ("/", PTG_DIV)], Self::power)
    }

    fn power(&mut self) -> ParseResult {
        self.binary(&[("^", PTG_POWER)], Self::unary)
    }

    fn unary(&mut self) -> ParseResult {
        match self.peek_op(&["-", "+"]) {
            Some(op) => {
                self.pos += 1;
                self.unary()?;
                self.out.push(if op == "-" { PTG_UMINUS } else { PTG_UPLUS });
                Ok(())
            }
            None => self.postfix(),
        }
    }

    fn postfix(&mut self) -> ParseResult {
        self.primary()?;
        while self.peek_op(&["%"]).is_some() {
            self.pos += 1;
            self.out.push(PTG_PERCENT);
        }
        Ok(())
    }

    fn primary(&mut self) -> ParseResult {
        match self.next() {
            Some(Token::Number(value)) => {
                self.number(value);
                Ok(())
            }
            Some(Token::Text(value)) => self.string(&value),
            Some(Token::Error(code)) => {
                self.out.extend_from_slice(&[PTG_ERR, code]);
                Ok(())
            }
            Some(Token::LParen) => {
                self.expression()?;
                match self.next() {
                    Some(Token::RParen) => {
                        self.out.push(PTG_PAREN);
                        Ok(())
                    }
                    _ => Err("missing closing parenthesis".to_string()),
                }
            }
            Some(Token::Name(name)) => self.name(&name),
            Some(token) => Err(format!("unexpected {:?}", token)),
            None => Err("unexpected end of formula".to_string()),
        }
    }

    fn number(&mut self, value: f64) {
        if value.fract() == 0.0 && (0.0..=f64::from(u16::MAX)).contains(&value) {
            self.out.push(PTG_INT);
            self.out.extend_from_slice(&(value as u16).to_le_bytes());
        } else {
            self.out.push(PTG_NUM);
            self.out.extend_from_slice(&value.to_le_bytes());
        }
    }

    fn string(&mut self, value: &str) -> ParseResult {
        let count = value.chars().count();
        if count > 255 {
            return Err(format!("string literal exceeds 255 characters ({})", count));
        }
        self.out.push(PTG_STR);
        if value.chars().all(|c| u32::from(c) <= 0xFF) {
            self.out.push(count as u8);
            self.out.push(0x00);
            self.out.extend(value.chars().map(|c| c as u8));
        } else {
            let units: Vec<u16> = value.encode_utf16().collect();
            let count = u8::try_from(units.len())
                .map_err(|_| "string literal exceeds 255 characters".to_string())?;
            self.out.push(count);
            self.out.push(0x01);
            self.out.extend(units.iter().flat_map(|u| u.to_le_bytes()));
        }
        Ok(())
    }

    fn name(&mut self, name: &str) -> ParseResult {
        if self.peek() == Some(&Token::LParen) {
            self.pos += 1;
            return self.function(name);
        }
        if name.eq_ignore_ascii_case("TRUE") || name.eq_ignore_ascii_case("FALSE") {
            let value = name.eq_ignore_ascii_case("TRUE");
            self.out.extend_from_slice(&[PTG_BOOL, u8::from(value)]);
            return Ok(());
        }

        let first = parse_cell_ref(name).ok_or_else(|| format!("unknown name '{}'", name))?;
        if self.peek() == Some(&Token::Colon) {
            self.pos += 1;
            let last = match self.next() {
                Some(Token::Name(end)) => parse_cell_ref(&end)
                    .ok_or_else(|| format!("invalid range end '{}'", end))?,
                _ => return Err(format!("incomplete range after '{}'", name)),
            };
            self.out.push(PTG_AREA);
            self.out.extend_from_slice(&first.row.to_le_bytes());
            self.out.extend_from_slice(&last.row.to_le_bytes());
            self.out.extend_from_slice(&first.column_field().to_le_bytes());
            self.out.extend_from_slice(&last.column_field().to_le_bytes());
        } else {
            self.out.push(PTG_REF);
            self.out.extend_from_slice(&first.row.to_le_bytes());
            self.out.extend_from_slice(&first.column_field().to_le_bytes());
        }
        Ok(())
    }

    fn function(&mut self, name: &str) -> ParseResult {
        let info = lookup_function(name)
            .ok_or_else(|| format!("function '{}' is not available in BIFF8", name))?;

        let mut argc: usize = 0;
        if self.peek() == Some(&Token::RParen) {
            self.pos += 1;
        } else {
            loop {
                match self.peek() {
                    Some(Token::Comma) | Some(Token::RParen) => self.out.push(PTG_MISS_ARG),
                    _ => self.expression()?,
                }
                argc += 1;
                match self.next() {
                    Some(Token::Comma) => continue,
                    Some(Token::RParen) => break,
                    _ => return Err(format!("missing ')' after arguments of {}", info.name)),
                }
            }
        }

        if argc < usize::from(info.min_args) || argc > usize::from(info.max_args) {
            return Err(format!(
                "{} takes {}..={} arguments, got {}",
                info.name, info.min_args, info.max_args, argc
            ));
        }

        if info.fixed {
            self.out.push(PTG_FUNC);
        } else {
            self.out.push(PTG_FUNC_VAR);
            self.out.push(argc as u8);
        }
        self.out.extend_from_slice(&info.index.to_le_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(
            parse_cell_ref("A1"),
            Some(CellRef {
                row: 0,
                column: 0,
                row_relative: true,
                column_relative: true
            })
        );
        let absolute = parse_cell_ref("$B$2").unwrap();
        assert_eq!((absolute.row, absolute.column), (1, 1));
        assert!(!absolute.row_relative && !absolute.column_relative);
        assert_eq!(parse_cell_ref("IV65536").map(|r| r.column), Some(255));
        assert!(parse_cell_ref("IW1").is_none());
        assert!(parse_cell_ref("A65537").is_none());
        assert!(parse_cell_ref("A0").is_none());
        assert!(parse_cell_ref("total").is_none());
    }

    #[test]
    fn test_operator_precedence() {
        // A1 + B1 * 2 => A1 B1 2 * +
        let tokens = compile("A1+B1*2").unwrap();
        assert_eq!(
            tokens,
            vec![
                PTG_REF, 0, 0, 0x00, 0xC0, //
                PTG_REF, 0, 0, 0x01, 0xC0, //
                PTG_INT, 2, 0, //
                PTG_MUL, PTG_ADD,
            ]
        );
    }

    #[test]
    fn test_sum_over_area() {
        let tokens = compile("SUM(A2:A4)").unwrap();
        assert_eq!(
            tokens,
            vec![PTG_AREA, 1, 0, 3, 0, 0x00, 0xC0, 0x00, 0xC0, PTG_FUNC_VAR, 1, 4, 0]
        );
    }

    #[test]
    fn test_fixed_and_nested_functions() {
        let tokens = compile("IF(A1>0,ROUND(A1,2),\"none\")").unwrap();
        // ROUNDは固定長引数（PtgFunc）、IFは可変長（PtgFuncVar, 3引数）
        assert!(tokens.windows(3).any(|w| w == [PTG_FUNC, 27, 0]));
        assert_eq!(&tokens[tokens.len() - 4..], &[PTG_FUNC_VAR, 3, 1, 0]);
    }

    #[test]
    fn test_literals() {
        assert_eq!(compile("TRUE").unwrap(), vec![PTG_BOOL, 1]);
        assert_eq!(compile("#N/A").unwrap(), vec![PTG_ERR, 0x2A]);
        assert_eq!(compile("\"a\"\"b\"").unwrap(), vec![PTG_STR, 3, 0, b'a', b'"', b'b']);
        let num = compile("1.5").unwrap();
        assert_eq!(num[0], PTG_NUM);
        assert_eq!(&num[1..], &1.5f64.to_le_bytes());
        assert_eq!(compile("-(1)%").unwrap(), vec![PTG_INT, 1, 0, PTG_PAREN, PTG_PERCENT, PTG_UMINUS]);
    }

    #[test]
    fn test_missing_argument() {
        let tokens = compile("SUM(1,,2)").unwrap();
        assert_eq!(
            tokens,
            vec![PTG_INT, 1, 0, PTG_MISS_ARG, PTG_INT, 2, 0, PTG_FUNC_VAR, 3, 4, 0]
        );
    }

    #[test]
    fn test_rejected_formulas() {
        for formula in [
            "IFERROR(A1,0)",
            "Sheet2!A1",
            "'My Sheet'!A1",
            "SUM(A1",
            "1+",
            "ROUND(1)",
            "total*2",
            "",
        ] {
            match compile(formula) {
                Err(XlsBridgeError::InvalidFormula { formula: f, .. }) => assert_eq!(f, formula),
                other => panic!("Expected InvalidFormula for {:?}, got {:?}", formula, other),
            }
        }
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(error_code("#DIV/0!"), Some(0x07));
        assert_eq!(error_code("#value!"), Some(0x0F));
        assert_eq!(error_code("oops"), None);
    }
}
