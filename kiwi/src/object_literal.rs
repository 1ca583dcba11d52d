//! Reading and writing dictionary modules.
//!
//! A dictionary file is one of:
//!
//! ```text
//! export default { home: { baoCun: '保存' } };
//! module.exports = { home: { baoCun: '保存' } };
//! { "home": { "baoCun": "保存" } }
//! ```
//!
//! The reader accepts the object-literal subset these files use: identifier,
//! string or numeric keys, string values (single, double or backtick quoted
//! without interpolation), nested objects, trailing commas and comments.

use serde_json::{Map, Value};

/// Output flavour of a dictionary module, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleFormat {
    /// `export default {...};` in a `.ts` file.
    TypeScript,
    /// `export default {...};` in a `.js` file.
    JavaScript,
    /// Plain JSON object.
    Json,
}

impl ModuleFormat {
    pub fn from_extension(ext: &str) -> Option<ModuleFormat> {
        match ext.to_ascii_lowercase().as_str() {
            "ts" => Some(ModuleFormat::TypeScript),
            "js" => Some(ModuleFormat::JavaScript),
            "json" => Some(ModuleFormat::Json),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ModuleFormat::TypeScript => "ts",
            ModuleFormat::JavaScript => "js",
            ModuleFormat::Json => "json",
        }
    }
}

/// Parses a dictionary module into its top-level object.
pub fn parse_module(source: &str) -> Result<Map<String, Value>, String> {
    let body_start = ["export default", "module.exports =", "module.exports="]
        .iter()
        .filter_map(|marker| source.find(marker).map(|i| i + marker.len()))
        .min();

    let mut parser = Parser {
        src: source.as_bytes(),
        text: source,
        pos: body_start.unwrap_or(0),
    };
    parser.skip_trivia();
    if parser.peek() != Some(b'{') {
        return Err(match body_start {
            Some(_) => "expected an object literal after the export".to_string(),
            None => "no `export default`, `module.exports` or JSON object found".to_string(),
        });
    }
    let map = parser.parse_object()?;
    parser.skip_trivia();
    if parser.peek() == Some(b';') {
        parser.pos += 1;
        parser.skip_trivia();
    }
    if parser.pos < parser.src.len() {
        return Err(format!("unexpected content at offset {}", parser.pos));
    }
    Ok(map)
}

struct Parser<'a> {
    src: &'a [u8],
    text: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() => self.pos += 1,
                Some(b'/') if self.src.get(self.pos + 1) == Some(&b'/') => {
                    while let Some(b) = self.peek() {
                        if b == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                Some(b'/') if self.src.get(self.pos + 1) == Some(&b'*') => {
                    match self.text[self.pos + 2..].find("*/") {
                        Some(i) => self.pos += i + 4,
                        None => self.pos = self.src.len(),
                    }
                }
                _ => {
                    // Skip a UTF-8 BOM or other non-breaking whitespace.
                    match self.text[self.pos..].chars().next() {
                        Some(c) if c.is_whitespace() || c == '\u{feff}' => {
                            self.pos += c.len_utf8()
                        }
                        _ => return,
                    }
                }
            }
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), String> {
        self.skip_trivia();
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(format!(
                "expected `{}` at offset {}",
                byte as char, self.pos
            ))
        }
    }

    fn parse_object(&mut self) -> Result<Map<String, Value>, String> {
        self.expect(b'{')?;
        let mut map = Map::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(map);
                }
                None => return Err("unterminated object literal".to_string()),
                _ => {}
            }

            let key = self.parse_key()?;
            self.expect(b':')?;
            self.skip_trivia();
            let value = match self.peek() {
                Some(b'{') => Value::Object(self.parse_object()?),
                Some(q @ (b'\'' | b'"' | b'`')) => Value::String(self.parse_string(q)?),
                _ => {
                    return Err(format!(
                        "unsupported value for `{}` at offset {}",
                        key, self.pos
                    ));
                }
            };
            map.insert(key, value);

            self.skip_trivia();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {}
                _ => return Err(format!("expected `,` or `}}` at offset {}", self.pos)),
            }
        }
    }

    fn parse_key(&mut self) -> Result<String, String> {
        match self.peek() {
            Some(q @ (b'\'' | b'"')) => self.parse_string(q),
            Some(b) if b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80 => {
                let start = self.pos;
                while let Some(c) = self.text[self.pos..].chars().next() {
                    if c.is_alphanumeric() || c == '_' || c == '$' {
                        self.pos += c.len_utf8();
                    } else {
                        break;
                    }
                }
                Ok(self.text[start..self.pos].to_string())
            }
            _ => Err(format!("expected a property name at offset {}", self.pos)),
        }
    }

    fn parse_string(&mut self, quote: u8) -> Result<String, String> {
        let start = self.pos;
        self.pos += 1;
        let mut out = String::new();
        loop {
            let Some(c) = self.text[self.pos..].chars().next() else {
                return Err(format!("unterminated string starting at offset {start}"));
            };
            self.pos += c.len_utf8();
            match c {
                '\\' => {
                    let Some(escaped) = self.text[self.pos..].chars().next() else {
                        return Err(format!("unterminated string starting at offset {start}"));
                    };
                    self.pos += escaped.len_utf8();
                    match escaped {
                        'n' => out.push('\n'),
                        'r' => out.push('\r'),
                        't' => out.push('\t'),
                        'b' => out.push('\u{8}'),
                        'f' => out.push('\u{c}'),
                        'v' => out.push('\u{b}'),
                        '0' => out.push('\0'),
                        'u' => out.push(self.parse_unicode_escape()?),
                        '\n' => {}
                        '\r' => {
                            if self.peek() == Some(b'\n') {
                                self.pos += 1;
                            }
                        }
                        other => out.push(other),
                    }
                }
                '$' if quote == b'`' && self.peek() == Some(b'{') => {
                    return Err(format!(
                        "template interpolation is not supported (offset {})",
                        self.pos - 1
                    ));
                }
                c if c as u32 == quote as u32 => return Ok(out),
                c => out.push(c),
            }
        }
    }

    fn parse_unicode_escape(&mut self) -> Result<char, String> {
        let rest = &self.text[self.pos..];
        let (hex, consumed) = if let Some(braced) = rest.strip_prefix('{') {
            let end = braced
                .find('}')
                .ok_or_else(|| format!("bad unicode escape at offset {}", self.pos))?;
            (&braced[..end], end + 2)
        } else {
            (rest.get(..4).unwrap_or(rest), 4)
        };
        let code = u32::from_str_radix(hex, 16)
            .map_err(|_| format!("bad unicode escape at offset {}", self.pos))?;
        self.pos += consumed;
        // Lone surrogates cannot be represented; keep the replacement character.
        Ok(char::from_u32(code).unwrap_or('\u{fffd}'))
    }
}

/// `true` for names that can be written unquoted as a property key.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Quotes `text` as a single-quoted JS string literal.
pub fn quote_single(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn write_object(map: &Map<String, Value>, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth + 1);
    out.push_str("{\n");
    for (key, value) in map {
        out.push_str(&indent);
        if is_identifier(key) {
            out.push_str(key);
        } else {
            out.push_str(&quote_single(key));
        }
        out.push_str(": ");
        match value {
            Value::Object(inner) => write_object(inner, depth + 1, out),
            Value::String(text) => out.push_str(&quote_single(text)),
            other => out.push_str(&quote_single(&other.to_string())),
        }
        out.push_str(",\n");
    }
    out.push_str(&"  ".repeat(depth));
    out.push('}');
}

/// Renders a dictionary module with two-space indentation.
pub fn render_module(map: &Map<String, Value>, format: ModuleFormat) -> String {
    match format {
        ModuleFormat::Json => {
            let mut out = serde_json::to_string_pretty(&Value::Object(map.clone()))
                .unwrap_or_else(|_| "{}".to_string());
            out.push('\n');
            out
        }
        ModuleFormat::TypeScript | ModuleFormat::JavaScript => {
            let mut out = String::from("export default ");
            write_object(map, 0, &mut out);
            out.push_str(";\n");
            out
        }
    }
}

/// Renders the locale `index` module that merges every namespace module.
pub fn render_index(namespaces: &[String]) -> String {
    let mut out = String::new();
    for ns in namespaces {
        out.push_str(&format!("import {ns} from './{ns}';\n"));
    }
    out.push_str("\nexport default Object.assign({}, {\n");
    for ns in namespaces {
        out.push_str(&format!("  {ns},\n"));
    }
    out.push_str("});\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_export_default() {
        let source = r#"
// generated
export default {
  baoCun: '保存',
  'save-btn': "保存按钮",
  nested: {
    tip: `提示`, /* trailing */
  },
};
"#;
        let map = parse_module(source).unwrap();
        assert_eq!(
            Value::Object(map),
            json!({"baoCun": "保存", "save-btn": "保存按钮", "nested": {"tip": "提示"}})
        );
    }

    #[test]
    fn test_parse_module_exports_and_json() {
        let map = parse_module("module.exports = { a: 'x\\'y' }").unwrap();
        assert_eq!(map["a"], json!("x'y"));
        let map = parse_module("{ \"a\": \"\\u4e2d\" }").unwrap();
        assert_eq!(map["a"], json!("中"));
    }

    #[test]
    fn test_parse_rejects_unsupported_values() {
        assert!(parse_module("export default { a: 1 };").unwrap_err().contains("unsupported"));
        assert!(parse_module("export default { a: `x${y}` };").is_err());
        assert!(parse_module("export default { a: 'x' ").is_err());
        assert!(parse_module("const a = 1;").is_err());
    }

    #[test]
    fn test_render_module_round_trips() {
        let value = json!({"baoCun": "保存", "1st": "第一", "nested": {"quote": "it's\nok"}});
        let map = value.as_object().unwrap().clone();
        let rendered = render_module(&map, ModuleFormat::TypeScript);
        assert!(rendered.starts_with("export default {\n  baoCun: '保存',\n"));
        assert!(rendered.contains("  '1st': '第一',\n"));
        assert!(rendered.contains("    quote: 'it\\'s\\nok',\n"));
        assert_eq!(parse_module(&rendered).unwrap(), map);

        let json = render_module(&map, ModuleFormat::Json);
        assert_eq!(parse_module(&json).unwrap(), map);
    }

    #[test]
    fn test_render_index() {
        let index = render_index(&["common".to_string(), "home".to_string()]);
        assert_eq!(
            index,
            "import common from './common';\nimport home from './home';\n\nexport default Object.assign({}, {\n  common,\n  home,\n});\n"
        );
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("baoCun"));
        assert!(is_identifier("$x_1"));
        assert!(!is_identifier("1st"));
        assert!(!is_identifier("save-btn"));
        assert!(!is_identifier(""));
    }
}
