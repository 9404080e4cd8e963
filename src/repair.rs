//! Best-effort cleanup of model output before JSON parsing.
//!
//! Models asked for "JSON only" still wrap it in markdown fences, prepend a
//! sentence, forget commas between array elements, leave trailing commas and put
//! raw line breaks inside strings. `normalize` fixes those cases and leaves
//! everything else alone. It never fails, and applying it twice is the same as
//! applying it once.

/// Normalize raw model output into text that is more likely to parse as JSON.
pub fn normalize(raw: &str) -> String {
  let unfenced = strip_code_fences(raw);
  let spaced = normalize_whitespace(unfenced.trim());
  match structured_span(&spaced) {
    Some(span) => repair_separators(span),
    None => spaced,
  }
}

fn strip_code_fences(s: &str) -> String {
  let mut out = s.replace("```json", "").replace("```JSON", "");
  // Removing one fence can expose another ("``````").
  while out.contains("```") {
    out = out.replace("```", "");
  }
  out
}

fn normalize_whitespace(s: &str) -> String {
  s.replace("\r\n", "\n").replace('\r', "\n").replace('\t', " ")
}

/// The text from the first `{`/`[` through the last `}`/`]`, if there is one.
fn structured_span(s: &str) -> Option<&str> {
  let start = s.find(|c| c == '{' || c == '[')?;
  let end = s.rfind(|c| c == '}' || c == ']')?;
  (start < end).then(|| &s[start..=end])
}

/// Single pass over the payload, tracking whether we are inside a string literal:
/// - outside strings, a value start (`{`, `[`, `"`) directly following a finished
///   value gets a `,` inserted right after that value;
/// - outside strings, commas followed only by further commas and a closer are dropped;
/// - inside strings, raw line breaks become `\n` escapes.
fn repair_separators(span: &str) -> String {
  let chars: Vec<char> = span.chars().collect();
  let mut out = String::with_capacity(span.len() + 16);
  let mut in_string = false;
  let mut escaped = false;
  // Byte offset in `out` just past the last completed value, while only whitespace follows it.
  let mut value_end: Option<usize> = None;

  for (i, &c) in chars.iter().enumerate() {
    if in_string {
      if escaped {
        out.push(c);
        escaped = false;
      } else if c == '\\' {
        out.push(c);
        escaped = true;
      } else if c == '"' {
        out.push(c);
        in_string = false;
        value_end = Some(out.len());
      } else if c == '\n' {
        out.push_str("\\n");
      } else {
        out.push(c);
      }
      continue;
    }

    match c {
      ',' => {
        let next = chars[i + 1..].iter().find(|n| !n.is_whitespace() && **n != ',');
        if matches!(next, Some('}') | Some(']')) {
          continue;
        }
        out.push(c);
        value_end = None;
      }
      '{' | '[' | '"' => {
        if let Some(pos) = value_end.take() {
          out.insert(pos, ',');
        }
        out.push(c);
        in_string = c == '"';
      }
      '}' | ']' => {
        out.push(c);
        value_end = Some(out.len());
      }
      c if c.is_ascii_alphanumeric() => {
        // numbers and true/false/null
        out.push(c);
        value_end = Some(out.len());
      }
      c if c.is_whitespace() => out.push(c),
      _ => {
        out.push(c);
        value_end = None;
      }
    }
  }
  out
}
