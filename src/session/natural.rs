use std::cmp::Ordering;

#[derive(Debug, Clone, Copy)]
enum Run<'a> {
    Text(&'a str),
    Digits(&'a str),
}

/// Split into alternating text and digit runs, always starting with a
/// (possibly empty) text run so runs at the same index have the same kind
fn runs(name: &str) -> Vec<Run<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_digits = false;

    for (i, c) in name.char_indices() {
        let digit = c.is_ascii_digit();
        if digit != in_digits {
            let run = &name[start..i];
            out.push(if in_digits { Run::Digits(run) } else { Run::Text(run) });
            start = i;
            in_digits = digit;
        }
    }
    let run = &name[start..];
    out.push(if in_digits { Run::Digits(run) } else { Run::Text(run) });
    out
}

/// Compare two digit strings as integers of any length
fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Natural ordering: `frame_2.png` sorts before `frame_10.png`.
///
/// Names that compare equal run-by-run (e.g. `01` and `1`) fall back to a
/// plain string comparison so the order is total.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (left, right) = (runs(a), runs(b));

    for (x, y) in left.iter().zip(&right) {
        let ord = match (x, y) {
            (Run::Digits(x), Run::Digits(y)) => cmp_digits(x, y),
            (Run::Text(x), Run::Text(y)) => x.cmp(y),
            (Run::Digits(_), Run::Text(_)) => Ordering::Less,
            (Run::Text(_), Run::Digits(_)) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    left.len().cmp(&right.len()).then_with(|| a.cmp(b))
}
