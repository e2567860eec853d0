pub mod extract;
pub mod labels;
pub mod normalize;
pub mod sections;

use extract::ExtractedWork;

/// Comments stripped → label sections → fields → one record.
pub fn process_document(html: &str, id: &str, category: &str, default_year: &str) -> ExtractedWork {
    let body = normalize::strip_comments(html);
    let sections = sections::scan_sections(&body);
    extract::extract_all(id, category, default_year, &body, &sections)
}
