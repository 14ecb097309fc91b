//! The text layout shared by the document builder and the field extractor.
//!
//! A bakery document is rendered as:
//!
//! ```text
//! 빵집 이름: <title>
//! 평점: 총점 <total>, 맛 <taste>, 가격 <price>, 고객서비스 <cs>, 주소: <address>
//! 리뷰: <content> (평점: <score>, 키워드: <kw1, kw2>)
//! ...
//! ```
//!
//! Both sides of the contract are written against the constants below, so a
//! label change here moves the renderer and the parser together.

/// Prefix of the first line, followed by the bakery title.
pub const NAME_LABEL: &str = "빵집 이름:";
/// Prefix of the score line.
pub const SCORE_LINE_LABEL: &str = "평점:";
/// Label before the total score.
pub const TOTAL_LABEL: &str = "총점";
/// Label before the taste score.
pub const TASTE_LABEL: &str = "맛";
/// Label before the price score.
pub const PRICE_LABEL: &str = "가격";
/// Label before the customer service score.
pub const SERVICE_LABEL: &str = "고객서비스";
/// Label before the address, last field on the score line.
pub const ADDRESS_LABEL: &str = "주소:";
/// Prefix of every review line.
pub const REVIEW_LABEL: &str = "리뷰:";
/// Label before a review's own score inside the parenthesised segment.
pub const REVIEW_SCORE_LABEL: &str = "평점:";
/// Label before a review's keyword list inside the parenthesised segment.
pub const KEYWORDS_LABEL: &str = "키워드:";
/// Separator between keywords.
pub const KEYWORD_SEPARATOR: &str = ", ";
/// Rendered in place of any missing value.
pub const PLACEHOLDER: &str = "N/A";

/// Collapse line breaks to spaces so a value cannot span lines.
pub fn single_line(value: &str) -> String {
    value.split(['\r', '\n']).filter(|part| !part.is_empty()).collect::<Vec<_>>().join(" ")
}

/// A keyword as it can appear inside a keyword group: on one line, with no
/// parentheses or commas that would end or split the group.
fn keyword_text(keyword: &str) -> String {
    single_line(&keyword.replace(['(', ')', ','], " ")).trim().to_string()
}

/// Render the name line.
pub fn name_line(title: &str) -> String {
    format!("{NAME_LABEL} {}", single_line(title))
}

/// Render the score line.
pub fn score_line(total: &str, taste: &str, price: &str, service: &str, address: &str) -> String {
    let [total, taste, price, service, address] =
        [total, taste, price, service, address].map(single_line);
    format!(
        "{SCORE_LINE_LABEL} {TOTAL_LABEL} {total}, {TASTE_LABEL} {taste}, {PRICE_LABEL} {price}, \
         {SERVICE_LABEL} {service}, {ADDRESS_LABEL} {address}"
    )
}

/// Render one review line.
pub fn review_line(content: &str, score: &str, keywords: &[String]) -> String {
    let keywords: Vec<String> = keywords.iter().map(|k| keyword_text(k)).collect();
    format!(
        "{REVIEW_LABEL} {} ({REVIEW_SCORE_LABEL} {}, {KEYWORDS_LABEL} {})",
        single_line(content),
        single_line(score),
        keywords.join(KEYWORD_SEPARATOR)
    )
}

/// Whether a captured value is the placeholder for a missing field.
pub fn is_placeholder(value: &str) -> bool {
    value == PLACEHOLDER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_breaks_collapse_to_spaces() {
        assert_eq!(single_line("Bread\nA"), "Bread A");
        assert_eq!(single_line("a\r\nb\n\nc"), "a b c");
        assert_eq!(name_line("Bread\r\nA"), "빵집 이름: Bread A");
    }

    #[test]
    fn keywords_cannot_close_their_group() {
        let line = review_line("좋아요\n키워드: 가짜", "5", &["진짜)".to_string(), "a,b".to_string()]);
        assert_eq!(line, "리뷰: 좋아요 키워드: 가짜 (평점: 5, 키워드: 진짜, a b)");
    }
}
