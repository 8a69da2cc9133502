use std::fmt;
use std::ops::{Index, IndexMut};

use super::Vector;

/// Resizable dense vector
///
/// # Examples
///
/// ```
/// use parla_core::{DenseVector, Vector};
///
/// let a = DenseVector::from_vec(vec![1.0, 2.0, 3.0]);
/// let b = DenseVector::from_vec(vec![4.0, 5.0, 6.0]);
/// assert_eq!(a.dot(&b).unwrap(), 32.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DenseVector {
    data: Vec<f64>,
}

impl DenseVector {
    /// Vector of `size` zeros
    pub fn zeros(size: usize) -> Self {
        Self {
            data: vec![0.0; size],
        }
    }

    /// Vector of `size` copies of `value`
    pub fn filled(size: usize, value: f64) -> Self {
        Self {
            data: vec![value; size],
        }
    }

    pub fn from_vec(data: Vec<f64>) -> Self {
        Self { data }
    }

    /// Copy of `other` resized to `size`
    ///
    /// The overlapping prefix is copied, any extra entries are zero.
    pub fn from_vector<V: Vector>(other: &V, size: usize) -> Self {
        let mut data = vec![0.0; size];
        let n = size.min(other.size());
        data[..n].copy_from_slice(&other.as_slice()[..n]);
        Self { data }
    }

    /// Grow with zeros or truncate to `size`
    pub fn resize(&mut self, size: usize) {
        self.data.resize(size, 0.0);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.data.iter()
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }
}

impl Vector for DenseVector {
    fn size(&self) -> usize {
        self.data.len()
    }

    fn as_slice(&self) -> &[f64] {
        &self.data
    }

    fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    fn zeros_like(&self) -> Self {
        Self::zeros(self.data.len())
    }

    fn to_dense(&self) -> DenseVector {
        self.clone()
    }
}

impl From<Vec<f64>> for DenseVector {
    fn from(data: Vec<f64>) -> Self {
        Self { data }
    }
}

impl FromIterator<f64> for DenseVector {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

impl Index<usize> for DenseVector {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.data[i]
    }
}

impl IndexMut<usize> for DenseVector {
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        &mut self.data[i]
    }
}

impl fmt::Display for DenseVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, x) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{x:.3e}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vector_resizes() {
        let a = DenseVector::from_vec(vec![1.0, 2.0, 3.0]);
        assert_eq!(DenseVector::from_vector(&a, 2).as_slice(), &[1.0, 2.0]);
        assert_eq!(
            DenseVector::from_vector(&a, 5).as_slice(),
            &[1.0, 2.0, 3.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_resize() {
        let mut a = DenseVector::filled(2, 7.0);
        a.resize(4);
        assert_eq!(a.as_slice(), &[7.0, 7.0, 0.0, 0.0]);
        a.resize(1);
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn test_get_set() {
        let mut a = DenseVector::zeros(3);
        a.set(1, 2.5);
        a[2] = -1.0;
        assert_eq!(a.get(1), 2.5);
        assert_eq!(a.get(2), -1.0);
        assert_eq!(a.zeros_like(), DenseVector::zeros(3));
    }

    #[test]
    fn test_display() {
        let a = DenseVector::from_vec(vec![1.0, -0.25]);
        assert_eq!(a.to_string(), "[1.000e0, -2.500e-1]");
    }

    #[test]
    #[should_panic]
    fn test_get_out_of_bounds() {
        let a = DenseVector::zeros(2);
        let _ = a.get(2);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trip() {
        let a = DenseVector::from_vec(vec![1.5, -2.0, 0.0]);
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, r#"{"data":[1.5,-2.0,0.0]}"#);
        let back: DenseVector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }
}
