//! Gregorian dates for segment coverage listings

/// Gregorian `(year, month, day)` of the civil day that starts at noon of
/// Julian day number `jdn` (Fliegel and Van Flandern, 1968)
fn gregorian_date(jdn: i64) -> (i64, i64, i64) {
    let mut l = jdn + 68569;
    let n = 4 * l / 146_097;
    l -= (146_097 * n + 3) / 4;
    let i = 4000 * (l + 1) / 1_461_001;
    l = l - 1461 * i / 4 + 31;
    let j = 80 * l / 2447;
    let day = l - 2447 * j / 80;
    l = j / 11;
    let month = j + 2 - 12 * l;
    let year = 100 * (n - 49) + i + l;
    (year, month, day)
}

/// `YYYY-MM-DD` of the civil day containing Julian date `jd`
pub fn format_date(jd: f64) -> String {
    let (year, month, day) = gregorian_date((jd + 0.5).floor() as i64);
    format!("{:04}-{:02}-{:02}", year, month, day)
}
