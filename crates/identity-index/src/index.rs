//! Person → image filename index built from an identity file.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use crate::types::{IndexError, IndexSummary, PersonId, SuffixRewrite};

/// Immutable mapping from person id to that person's image filenames.
///
/// Person ids are kept in order of first appearance in the source file; that
/// order defines the addressable range `[0, len)`. Every person holds at least
/// one filename, since a person is only recorded when one of their lines is read.
#[derive(Debug, Clone, Default)]
pub struct IdentityIndex {
    person_ids: Vec<PersonId>,
    images: HashMap<PersonId, Vec<String>>,
}

impl IdentityIndex {
    /// Read and parse an identity file.
    ///
    /// # Errors
    /// Fails on the first malformed line; there is no partial index.
    pub fn from_file(path: &Path, rewrite: Option<&SuffixRewrite>) -> Result<Self, IndexError> {
        let file = std::fs::File::open(path).map_err(|source| IndexError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let index = Self::from_reader(std::io::BufReader::new(file), rewrite)?;

        tracing::info!(
            path = %path.display(),
            persons = index.len(),
            images = index.num_images(),
            "Loaded identity index"
        );

        Ok(index)
    }

    /// Parse identity records from any buffered reader.
    pub fn from_reader<R: BufRead>(
        reader: R,
        rewrite: Option<&SuffixRewrite>,
    ) -> Result<Self, IndexError> {
        let mut index = Self::default();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let (filename, person_id) = parse_line(&line, i + 1)?;
            let filename = match rewrite {
                Some(rewrite) => rewrite.apply(filename),
                None => filename.to_string(),
            };
            index.insert(person_id, filename);
        }

        Ok(index)
    }

    /// Parse identity records from an in-memory string.
    pub fn parse_str(contents: &str, rewrite: Option<&SuffixRewrite>) -> Result<Self, IndexError> {
        Self::from_reader(contents.as_bytes(), rewrite)
    }

    fn insert(&mut self, person_id: PersonId, filename: String) {
        match self.images.get_mut(&person_id) {
            Some(images) => images.push(filename),
            None => {
                self.person_ids.push(person_id);
                self.images.insert(person_id, vec![filename]);
            }
        }
    }

    /// Number of unique persons (not images).
    pub fn len(&self) -> usize {
        self.person_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.person_ids.is_empty()
    }

    /// Unique person ids in first-appearance order.
    pub fn person_ids(&self) -> &[PersonId] {
        &self.person_ids
    }

    /// Person id at a position of the person list.
    pub fn person_at(&self, index: usize) -> Option<PersonId> {
        self.person_ids.get(index).copied()
    }

    /// Filenames recorded for a person, in file order.
    pub fn images_of(&self, person_id: PersonId) -> Option<&[String]> {
        self.images.get(&person_id).map(Vec::as_slice)
    }

    /// Total number of filenames across all persons.
    pub fn num_images(&self) -> usize {
        self.images.values().map(Vec::len).sum()
    }

    /// Compute summary statistics over the index.
    pub fn summary(&self) -> IndexSummary {
        let counts = || self.images.values().map(Vec::len);
        IndexSummary {
            persons: self.len(),
            images: self.num_images(),
            single_image_persons: counts().filter(|&n| n < 2).count(),
            min_images_per_person: counts().min().unwrap_or(0),
            max_images_per_person: counts().max().unwrap_or(0),
        }
    }
}

/// Split a line into `(filename, person_id)`. `line_no` is 1-based.
fn parse_line(line: &str, line_no: usize) -> Result<(&str, PersonId), IndexError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let &[filename, person_id] = fields.as_slice() else {
        return Err(IndexError::FieldCount {
            line: line_no,
            found: fields.len(),
        });
    };

    let person_id = person_id
        .parse::<PersonId>()
        .map_err(|source| IndexError::InvalidPersonId {
            line: line_no,
            token: person_id.to_string(),
            source,
        })?;

    Ok((filename, person_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
000001.jpg 2880
000002.jpg 2937
000003.jpg 2880
000004.jpg 12
000005.jpg 2937
";

    #[test]
    fn test_parse_groups_by_person() {
        let index = IdentityIndex::parse_str(SAMPLE, Some(&SuffixRewrite::default())).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.num_images(), 5);
        assert_eq!(
            index.images_of(2880).unwrap(),
            &["000001.png".to_string(), "000003.png".to_string()]
        );
        assert_eq!(index.images_of(12).unwrap(), &["000004.png".to_string()]);
        assert!(index.images_of(7).is_none());
    }

    #[test]
    fn test_person_ids_in_first_appearance_order() {
        let index = IdentityIndex::parse_str(SAMPLE, None).unwrap();
        assert_eq!(index.person_ids(), &[2880, 2937, 12]);
        assert_eq!(index.person_at(2), Some(12));
        assert_eq!(index.person_at(3), None);
    }

    #[test]
    fn test_no_rewrite_keeps_names() {
        let index = IdentityIndex::parse_str(SAMPLE, None).unwrap();
        assert_eq!(index.images_of(12).unwrap(), &["000004.jpg".to_string()]);
    }

    #[test]
    fn test_tolerates_extra_whitespace() {
        let index = IdentityIndex::parse_str("  a.jpg \t  7  \r\nb.jpg 7\n", None).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.images_of(7).unwrap().len(), 2);
    }

    #[test]
    fn test_three_fields_rejected() {
        let err = IdentityIndex::parse_str("a.jpg 1\nb.jpg 2 extra\n", None).unwrap_err();
        match err {
            IndexError::FieldCount { line, found } => {
                assert_eq!(line, 2);
                assert_eq!(found, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_single_field_rejected() {
        let err = IdentityIndex::parse_str("a.jpg\n", None).unwrap_err();
        assert!(matches!(err, IndexError::FieldCount { line: 1, found: 1 }));
    }

    #[test]
    fn test_blank_line_rejected() {
        let err = IdentityIndex::parse_str("a.jpg 1\n\nb.jpg 2\n", None).unwrap_err();
        assert!(matches!(err, IndexError::FieldCount { line: 2, found: 0 }));
    }

    #[test]
    fn test_non_integer_id_rejected() {
        let err = IdentityIndex::parse_str("a.jpg one\n", None).unwrap_err();
        match err {
            IndexError::InvalidPersonId { line, token, .. } => {
                assert_eq!(line, 1);
                assert_eq!(token, "one");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_negative_id_rejected() {
        let err = IdentityIndex::parse_str("a.jpg -3\n", None).unwrap_err();
        assert!(matches!(err, IndexError::InvalidPersonId { .. }));
    }

    #[test]
    fn test_empty_input() {
        let index = IdentityIndex::parse_str("", None).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.summary(), IndexSummary::default());
    }

    #[test]
    fn test_summary() {
        let index = IdentityIndex::parse_str(SAMPLE, None).unwrap();
        let summary = index.summary();
        assert_eq!(summary.persons, 3);
        assert_eq!(summary.images, 5);
        assert_eq!(summary.single_image_persons, 1);
        assert_eq!(summary.min_images_per_person, 1);
        assert_eq!(summary.max_images_per_person, 2);
        assert_eq!(summary.eligible_persons(), 2);
    }
}
