use colored::Colorize;
use std::time::Duration;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    eprintln!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

// ============================================================================
// Tables
// ============================================================================

/// Print rows as left-aligned columns, with a bold header row
pub fn table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let header_line = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| format!("{:<w$}", h, w = w))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{}", header_line.trim_end().bold());

    for row in rows {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:<w$}", cell, w = w))
            .collect::<Vec<_>>()
            .join("  ");
        println!("{}", line.trim_end());
    }
}

// ============================================================================
// Duration Parsing
// ============================================================================

/// Parse a duration literal (e.g., "30s", "1m30s", "2h", "500ms", "45")
///
/// Supports units h, m, s, ms, which may be chained. A bare number is seconds.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let s = input.trim();

    if s.is_empty() {
        return Err("Empty duration string".to_string());
    }

    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    let mut total = Duration::ZERO;
    let mut rest = s;
    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(rest.len());
        if num_len == 0 {
            return Err(format!("Invalid duration: '{}'", s));
        }
        let (num_str, tail) = rest.split_at(num_len);
        let unit_len = tail.find(|c: char| c.is_ascii_digit()).unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_len);

        let num: f64 = num_str
            .parse()
            .map_err(|_| format!("Invalid number in duration: '{}'", num_str))?;

        let secs = match unit {
            "h" => num * 3600.0,
            "m" => num * 60.0,
            "s" => num,
            "ms" => num / 1000.0,
            "" => return Err(format!("Missing unit in duration: '{}'", s)),
            other => return Err(format!("Unknown duration unit '{}' in '{}'", other, s)),
        };

        let part = Duration::try_from_secs_f64(secs)
            .map_err(|_| format!("Duration out of range: '{}'", s))?;
        total = total
            .checked_add(part)
            .ok_or_else(|| format!("Duration out of range: '{}'", s))?;
        rest = next;
    }

    Ok(total)
}

// ============================================================================
// Tests
// ============================================================================
