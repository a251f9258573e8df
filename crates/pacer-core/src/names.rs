//! Patient names recovered from report filenames.

use std::sync::LazyLock;

use regex::Regex;

/// Cut points applied in order; everything from the first occurrence of
/// each one onward is dropped.
const NAME_CUT_POINTS: &[&str] = &[
    "起搏器报告单",
    "CRT-P报告单",
    "CRT-D报告单",
    "ICD报告单",
    "（美敦力）",
    "（雅培）",
    "（百多力）",
    "(美敦力)",
    "(雅培)",
    "(百多力)",
    "Vitatron",
    " ",
    "(",
    "（",
    ")",
    "）",
    "-",
    "_",
];

static TRAILING_COPY_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(\d+\)\s*$").expect("Invalid copy number regex"));

static TRAILING_WIDE_COPY_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*（\d+）\s*$").expect("Invalid copy number regex"));

/// Patient name implied by a report filename.
///
/// ```
/// use pacer_core::derive_name_from_filename;
///
/// assert_eq!(derive_name_from_filename("张三起搏器报告单（美敦力）.xls"), "张三");
/// assert_eq!(derive_name_from_filename("李四 ICD报告单(2).xlsx"), "李四");
/// ```
pub fn derive_name_from_filename(filename: &str) -> String {
    let mut name = filename.replace(".xlsx", "").replace(".xls", "");
    for cut in NAME_CUT_POINTS {
        if let Some(position) = name.find(cut) {
            name.truncate(position);
        }
    }
    let name = TRAILING_COPY_NUMBER.replace(&name, "");
    let name = TRAILING_WIDE_COPY_NUMBER.replace(&name, "");
    name.trim().to_string()
}

/// Either name contains the other.
pub fn names_match(filename_name: &str, header_name: &str) -> bool {
    header_name.contains(filename_name) || filename_name.contains(header_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_report_and_brand_suffixes() {
        assert_eq!(derive_name_from_filename("王五CRT-D报告单.xlsx"), "王五");
        assert_eq!(derive_name_from_filename("赵六(雅培).xls"), "赵六");
        assert_eq!(derive_name_from_filename("孙七Vitatron.xls"), "孙七");
        assert_eq!(derive_name_from_filename("周八_2021.xls"), "周八");
        assert_eq!(derive_name_from_filename("吴九-复查.xlsx"), "吴九");
    }

    #[test]
    fn cut_order_is_fixed() {
        // The report-type cut runs before the space cut.
        assert_eq!(derive_name_from_filename("郑十 起搏器报告单.xls"), "郑十");
        assert_eq!(derive_name_from_filename("ICD报告单 钱一.xls"), "");
    }

    #[test]
    fn substring_match_in_either_direction() {
        assert!(names_match("张三", "张三"));
        assert!(names_match("张三", "张三丰"));
        assert!(names_match("张三丰", "张三"));
        assert!(!names_match("李四", "王五"));
    }
}
