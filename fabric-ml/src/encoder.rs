use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::error::{MlError, MlResult};

/// Bidirectional mapping between categorical labels and small integer codes.
///
/// Codes are assigned in sorted label order, so fitting the same set of
/// labels always yields the same codes regardless of row order. An encoder
/// is immutable once fitted: there is no re-fit, and the instance used to
/// encode training targets must be the one used to decode predictions.
///
/// Serializes as the ordered class list; the reverse index is rebuilt on
/// deserialization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct CategoryEncoder {
    classes: Vec<String>,
    index: HashMap<String, usize>,
}

impl CategoryEncoder {
    /// Fit an encoder over a column of labels.
    pub fn fit<I, S>(labels: I) -> MlResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let distinct: BTreeSet<String> = labels
            .into_iter()
            .map(|l| l.as_ref().to_string())
            .collect();
        if distinct.is_empty() {
            return Err(MlError::EmptyTrainingSet);
        }
        Ok(Self::from(distinct.into_iter().collect::<Vec<_>>()))
    }

    /// Map a label to its code.
    pub fn encode(&self, label: &str) -> MlResult<usize> {
        self.index
            .get(label)
            .copied()
            .ok_or_else(|| MlError::UnknownLabel(label.to_string()))
    }

    /// Encode a whole column. Fails on the first unseen label.
    pub fn transform<I, S>(&self, labels: I) -> MlResult<Vec<usize>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        labels
            .into_iter()
            .map(|l| self.encode(l.as_ref()))
            .collect()
    }

    /// Map a code back to its label.
    pub fn decode(&self, code: usize) -> MlResult<&str> {
        self.classes
            .get(code)
            .map(String::as_str)
            .ok_or(MlError::UnknownCode {
                code,
                classes: self.classes.len(),
            })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl From<Vec<String>> for CategoryEncoder {
    fn from(mut classes: Vec<String>) -> Self {
        classes.sort();
        classes.dedup();
        let index = classes
            .iter()
            .enumerate()
            .map(|(code, label)| (label.clone(), code))
            .collect();
        Self { classes, index }
    }
}

impl From<CategoryEncoder> for Vec<String> {
    fn from(encoder: CategoryEncoder) -> Self {
        encoder.classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn codes_follow_sorted_order() {
        let enc = CategoryEncoder::fit(["Incineration", "Composting", "Mechanical Recycling"])
            .unwrap();
        assert_eq!(enc.encode("Composting").unwrap(), 0);
        assert_eq!(enc.encode("Incineration").unwrap(), 1);
        assert_eq!(enc.encode("Mechanical Recycling").unwrap(), 2);
    }

    #[test]
    fn fit_is_independent_of_row_order() {
        let a = CategoryEncoder::fit(["Yes", "No", "Yes"]).unwrap();
        let b = CategoryEncoder::fit(["No", "Yes", "No", "No"]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.encode("No").unwrap(), 0);
        assert_eq!(a.encode("Yes").unwrap(), 1);
    }

    #[test]
    fn unknown_label_fails() {
        let enc = CategoryEncoder::fit(["Yes", "No"]).unwrap();
        let err = enc.encode("Maybe").unwrap_err();
        assert!(matches!(err, MlError::UnknownLabel(ref l) if l == "Maybe"));
    }

    #[test]
    fn unknown_code_fails() {
        let enc = CategoryEncoder::fit(["Yes", "No"]).unwrap();
        assert!(matches!(
            enc.decode(2),
            Err(MlError::UnknownCode { code: 2, classes: 2 })
        ));
    }

    #[test]
    fn empty_fit_is_rejected() {
        let labels: Vec<&str> = Vec::new();
        assert!(matches!(
            CategoryEncoder::fit(labels),
            Err(MlError::EmptyTrainingSet)
        ));
    }

    #[test]
    fn transform_encodes_a_column() {
        let enc = CategoryEncoder::fit(["b", "a", "c"]).unwrap();
        assert_eq!(enc.transform(["c", "a", "a"]).unwrap(), vec![2, 0, 0]);
        assert!(enc.transform(["a", "z"]).is_err());
    }

    #[test]
    fn serde_preserves_codes() {
        let enc = CategoryEncoder::fit(["Chemical Recycling", "Composting"]).unwrap();
        let json = serde_json::to_string(&enc).unwrap();
        assert_eq!(json, r#"["Chemical Recycling","Composting"]"#);
        let back: CategoryEncoder = serde_json::from_str(&json).unwrap();
        assert_eq!(back.encode("Composting").unwrap(), 1);
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(labels in proptest::collection::vec("[A-Za-z ]{1,12}", 1..20)) {
            let enc = CategoryEncoder::fit(&labels).unwrap();
            for label in &labels {
                let code = enc.encode(label).unwrap();
                prop_assert_eq!(enc.decode(code).unwrap(), label.as_str());
            }
            prop_assert!(enc.decode(enc.len()).is_err());
        }
    }
}
