//! JavaScript snippets evaluated in the page by [`ChromeDriver`](super::ChromeDriver).
//!
//! Selectors are embedded as JSON string literals, so quotes and
//! backslashes in user-configured selectors cannot break out of the script.

use crate::scraper::selectors::FeeSelectors;

pub const READY_STATE: &str = "document.readyState";

pub const HISTORY_BACK: &str = "(() => { history.back(); return true; })()";

/// Called on an element: true when a pointer click at its center would
/// reach the element itself and not an overlay
pub const HIT_TEST_FN: &str = r#"
function() {
    const rect = this.getBoundingClientRect();
    const x = rect.left + rect.width / 2;
    const y = rect.top + rect.height / 2;
    const hit = document.elementFromPoint(x, y);
    return !!hit && (hit === this || this.contains(hit));
}
"#;

pub const FORCED_CLICK_FN: &str = "function() { this.click(); return true; }";

pub const CLEAR_VALUE_FN: &str = r#"
function() {
    this.focus();
    this.value = '';
    this.dispatchEvent(new Event('input', { bubbles: true }));
    return true;
}
"#;

fn literal(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

pub fn exists(selector: &str) -> String {
    format!("document.querySelector({}) !== null", literal(selector))
}

pub fn text(selector: &str) -> String {
    format!(
        "(() => {{ const el = document.querySelector({}); return el ? el.innerText.trim() : null; }})()",
        literal(selector)
    )
}

pub fn input_value(selector: &str) -> String {
    format!(
        "(() => {{ const el = document.querySelector({}); return el ? el.value : null; }})()",
        literal(selector)
    )
}

/// Label and tag text of every fee row on the profile page
pub fn fee_rows(selectors: &FeeSelectors) -> String {
    let row = literal(&selectors.row);
    let label = literal(&selectors.label);
    let tag = literal(&selectors.tag);

    format!(
        r#"
        (() => {{
            const rows = Array.from(document.querySelectorAll({row}));
            const read = (root, selector) => {{
                const el = root.querySelector(selector);
                return el ? el.innerText.trim() : '';
            }};
            return rows.map(row => ({{
                label: read(row, {label}),
                tag: read(row, {tag})
            }}));
        }})()
        "#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exists_script_quotes_selector() {
        let script = exists("div[data-test='total-number-of-results']");
        assert_eq!(
            script,
            r#"document.querySelector("div[data-test='total-number-of-results']") !== null"#
        );
    }

    #[test]
    fn test_selector_cannot_escape_literal() {
        let script = text(r#"a[title="x"]"#);
        assert!(script.contains(r#"document.querySelector("a[title=\"x\"]")"#));
    }

    #[test]
    fn test_fee_rows_script_generation() {
        let script = fee_rows(&FeeSelectors::default());
        assert!(script.contains(r#"querySelectorAll(".dl-profile-fee")"#));
        assert!(script.contains(r#"read(row, ".dl-profile-fee-name")"#));
        assert!(script.contains(r#"read(row, ".dl-profile-fee-tag")"#));
    }

    #[test]
    fn test_element_functions_are_declarations() {
        for f in [HIT_TEST_FN, FORCED_CLICK_FN, CLEAR_VALUE_FN] {
            assert!(f.trim_start().starts_with("function()"));
        }
    }
}
