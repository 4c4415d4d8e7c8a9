//! Display patterns for order timestamps.
//!
//! Patterns use the familiar `dd-MM-yyyy HH:mm` letter notation. They are
//! compiled once into a chrono format string so that formatting a row is a
//! plain `DateTime::format` call.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

use crate::error::PatternError;

pub const DEFAULT_PATTERN: &str = "dd-MM-yyyy HH:mm";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePattern {
    chrono_fmt: String,
}

impl DatePattern {
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }

        let chars: Vec<char> = pattern.chars().collect();
        let mut chrono_fmt = String::with_capacity(pattern.len() * 2);
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            let run = chars[i..].iter().take_while(|&&x| x == c).count();

            if !c.is_ascii_alphabetic() {
                for _ in 0..run {
                    // '%' is chrono's escape character
                    if c == '%' {
                        chrono_fmt.push_str("%%");
                    } else {
                        chrono_fmt.push(c);
                    }
                }
                i += run;
                continue;
            }

            let token: String = std::iter::repeat(c).take(run).collect();
            let spec = match token.as_str() {
                "yyyy" => "%Y",
                "yy" => "%y",
                "MM" => "%m",
                "dd" => "%d",
                "HH" => "%H",
                "mm" => "%M",
                "ss" => "%S",
                _ => return Err(PatternError::UnsupportedToken(token)),
            };
            chrono_fmt.push_str(spec);
            i += run;
        }

        Ok(Self {
            chrono_fmt,
        })
    }

    /// Renders `ts` in its own offset.
    pub fn format(&self, ts: &DateTime<FixedOffset>) -> String {
        ts.format(&self.chrono_fmt).to_string()
    }

    /// Reads a rendered value back for ordering. Patterns without a time
    /// part sort at midnight.
    pub fn sort_key(&self, rendered: &str) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(rendered, &self.chrono_fmt)
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(rendered, &self.chrono_fmt)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    }
}

impl Default for DatePattern {
    fn default() -> Self {
        Self {
            chrono_fmt: "%d-%m-%Y %H:%M".to_string(),
        }
    }
}
