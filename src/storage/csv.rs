//! Minimal CSV codec for the table files.
//!
//! Comma delimited, `"` quoted, doubled quotes as escapes. Quoted fields may
//! span lines. The first record is always the header.

const DELIMITER: char = ',';
const QUOTE: char = '"';

/// Decoding failure, with the 1-based line where the offending record started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvError {
    pub line: usize,
    pub reason: String,
}

/// Quote a single field if it contains the delimiter, a quote, or a line break.
pub fn quote_field(value: &str) -> String {
    let needs_quoting = value.contains(DELIMITER)
        || value.contains(QUOTE)
        || value.contains('\n')
        || value.contains('\r');

    if needs_quoting {
        format!("{QUOTE}{}{QUOTE}", value.replace(QUOTE, "\"\""))
    } else {
        value.to_string()
    }
}

/// Encode one record as a line, without the trailing newline.
pub fn encode_record<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| quote_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Encode a header plus rows. Every line ends with `\n`.
pub fn encode_document<S: AsRef<str>>(header: &[S], rows: &[Vec<String>]) -> String {
    let mut out = encode_record(header);
    out.push('\n');
    for row in rows {
        out.push_str(&encode_record(row));
        out.push('\n');
    }
    out
}

/// Decode a whole document into records, each paired with the 1-based line it
/// starts on. Blank lines between records are skipped.
pub fn decode_records(input: &str) -> Result<Vec<(usize, Vec<String>)>, CsvError> {
    let mut records = Vec::new();
    let mut chars = input.chars().peekable();
    let mut line = 1usize;

    while chars.peek().is_some() {
        let start_line = line;
        let mut fields = Vec::new();
        let mut field = String::new();
        let mut in_quotes = false;
        let mut quoted = false;

        loop {
            let Some(c) = chars.next() else {
                if in_quotes {
                    return Err(CsvError {
                        line: start_line,
                        reason: "unterminated quoted field".to_string(),
                    });
                }
                fields.push(std::mem::take(&mut field));
                break;
            };

            if in_quotes {
                match c {
                    QUOTE if chars.peek() == Some(&QUOTE) => {
                        chars.next();
                        field.push(QUOTE);
                    }
                    QUOTE => in_quotes = false,
                    '\n' => {
                        line += 1;
                        field.push(c);
                    }
                    _ => field.push(c),
                }
                continue;
            }

            match c {
                QUOTE if field.is_empty() && !quoted => {
                    in_quotes = true;
                    quoted = true;
                }
                QUOTE => {
                    return Err(CsvError {
                        line,
                        reason: "unexpected quote inside field".to_string(),
                    });
                }
                DELIMITER => {
                    fields.push(std::mem::take(&mut field));
                    quoted = false;
                }
                '\r' if chars.peek() == Some(&'\n') => {}
                '\n' => {
                    line += 1;
                    fields.push(std::mem::take(&mut field));
                    break;
                }
                _ if quoted => {
                    return Err(CsvError {
                        line,
                        reason: "unexpected character after closing quote".to_string(),
                    });
                }
                _ => field.push(c),
            }
        }

        let blank = fields.len() == 1 && fields[0].is_empty() && !quoted;
        if !blank {
            records.push((start_line, fields));
        }
    }

    Ok(records)
}
