//! Translation table (component **T**): the ordered list of integer 3-vectors
//! enumerating a periodic volume's equivalent images.

use crate::error::CavityAnalysisError;
use crate::types::{add, Pos3};

/// An ordered list of integer translation vectors.
///
/// Two distinct uses exist (see §3 of the specification):
/// - the table handed to the discretization marker (D) must **exclude** the
///   zero vector;
/// - the table handed to the voxelizer (A), cavity assigner (C) and
///   intersection scanner (I) must **include** it as the identity translation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TranslationTable {
    vectors: Vec<Pos3>,
}

impl TranslationTable {
    /// Builds a translation table from the given vectors, without the identity.
    ///
    /// Used for the discretization marker (D), which requires the zero vector
    /// to be absent since it encodes *non-trivial* periodic equivalents.
    pub fn without_identity(vectors: Vec<Pos3>) -> Result<Self, CavityAnalysisError> {
        if vectors.is_empty() {
            return Err(CavityAnalysisError::EmptyTranslationTable);
        }
        if vectors.contains(&[0, 0, 0]) {
            return Err(CavityAnalysisError::ZeroTranslationPresent);
        }
        Ok(Self { vectors })
    }

    /// Builds a translation table for use by A, C and I, prepending the
    /// identity translation if it is not already present.
    pub fn with_identity(vectors: Vec<Pos3>) -> Self {
        if vectors.first() == Some(&[0, 0, 0]) {
            Self { vectors }
        } else {
            let mut all = Vec::with_capacity(vectors.len() + 1);
            all.push([0, 0, 0]);
            all.extend(vectors);
            Self { vectors: all }
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Pos3] {
        &self.vectors
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (usize, Pos3)> + '_ {
        self.vectors.iter().copied().enumerate()
    }

    /// Applies translation `t` to `p`.
    #[inline]
    pub fn apply(&self, t: usize, p: Pos3) -> Pos3 {
        add(p, self.vectors[t])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn without_identity_rejects_zero_vector() {
        let err = TranslationTable::without_identity(vec![[0, 0, 0]]).unwrap_err();
        assert!(matches!(err, CavityAnalysisError::ZeroTranslationPresent));
    }

    #[test]
    fn without_identity_rejects_empty() {
        let err = TranslationTable::without_identity(vec![]).unwrap_err();
        assert!(matches!(err, CavityAnalysisError::EmptyTranslationTable));
    }

    #[test]
    fn with_identity_prepends_zero_vector_once() {
        let t = TranslationTable::with_identity(vec![[10, 0, 0]]);
        assert_eq!(t.as_slice(), &[[0, 0, 0], [10, 0, 0]]);

        let t2 = TranslationTable::with_identity(vec![[0, 0, 0], [10, 0, 0]]);
        assert_eq!(t2.as_slice(), &[[0, 0, 0], [10, 0, 0]]);
    }
}
