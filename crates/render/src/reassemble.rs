//! Run reassembly for paragraphs whose text is split across styled runs.
//!
//! Editors routinely break `{{token}}` into several runs (`{{stu`,
//! `dent_name}}`). Substitution therefore works on the paragraph's logical
//! text: concatenate every run, rewrite, put the result in the first run and
//! blank the rest. The first run's formatting wins.
//!
//! Nothing here knows about a document format; a format adapter implements
//! [`RunContainer`] for its paragraph type.

/// A paragraph as an ordered sequence of text runs.
pub trait RunContainer {
    fn run_count(&self) -> usize;
    fn run_text(&self, index: usize) -> &str;
    fn set_run_text(&mut self, index: usize, text: String);
}

/// Concatenated text of all runs.
pub fn logical_text<C: RunContainer + ?Sized>(container: &C) -> String {
    (0..container.run_count())
        .map(|i| container.run_text(i))
        .collect()
}

/// Apply `rewrite` to the logical text. When it returns `Some`, the new text
/// goes into run 0 and every later run is emptied. Returns whether the
/// container changed.
pub fn rewrite_runs<C, F>(container: &mut C, rewrite: F) -> bool
where
    C: RunContainer + ?Sized,
    F: FnOnce(&str) -> Option<String>,
{
    if container.run_count() == 0 {
        return false;
    }

    let text = logical_text(container);
    let Some(new_text) = rewrite(&text) else {
        return false;
    };

    container.set_run_text(0, new_text);
    for i in 1..container.run_count() {
        container.set_run_text(i, String::new());
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Runs(Vec<String>);

    impl RunContainer for Runs {
        fn run_count(&self) -> usize {
            self.0.len()
        }
        fn run_text(&self, index: usize) -> &str {
            &self.0[index]
        }
        fn set_run_text(&mut self, index: usize, text: String) {
            self.0[index] = text;
        }
    }

    fn runs(parts: &[&str]) -> Runs {
        Runs(parts.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn fragmented_token_is_rejoined() {
        let mut p = runs(&["姓名：{{stu", "dent_", "name}}", "！"]);
        let changed = rewrite_runs(&mut p, |t| Some(t.replace("{{student_name}}", "趙祈佑")));
        assert!(changed);
        assert_eq!(p.0, vec!["姓名：趙祈佑！", "", "", ""]);
    }

    #[test]
    fn untouched_when_rewrite_declines() {
        let mut p = runs(&["a", "b"]);
        assert!(!rewrite_runs(&mut p, |_| None));
        assert_eq!(p.0, vec!["a", "b"]);
    }

    #[test]
    fn empty_paragraph_is_skipped() {
        let mut p = runs(&[]);
        assert!(!rewrite_runs(&mut p, |_| Some("x".into())));
    }

    #[test]
    fn logical_text_concatenates() {
        assert_eq!(logical_text(&runs(&["{{", "x", "}}"])), "{{x}}");
    }
}
