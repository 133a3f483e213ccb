use crate::ir::ElementType;

/// Tensor geometry: element type, per-axis extents and row-major strides.
///
/// A shape flagged dynamic carries provisional extents (whatever the graph
/// front-end knew, possibly zero); compile-time lowering paths must convert
/// it with [`Shape::to_static`] first and only rely on the rank.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    elem_type: ElementType,
    lens: Vec<usize>,
    strides: Vec<usize>,
    dynamic: bool,
}

fn contiguous_strides(lens: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; lens.len()];
    for axis in (0..lens.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * lens[axis + 1];
    }
    strides
}

impl Shape {
    /// A static shape with standard (row-major contiguous) strides.
    pub fn new(elem_type: ElementType, lens: Vec<usize>) -> Self {
        let strides = contiguous_strides(&lens);
        Self {
            elem_type,
            lens,
            strides,
            dynamic: false,
        }
    }

    /// A shape with one or more extents unknown until run time.
    pub fn new_dynamic(elem_type: ElementType, lens: Vec<usize>) -> Self {
        Self {
            dynamic: true,
            ..Self::new(elem_type, lens)
        }
    }

    pub fn elem_type(&self) -> ElementType {
        self.elem_type
    }

    pub fn lens(&self) -> &[usize] {
        &self.lens
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn rank(&self) -> usize {
        self.lens.len()
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// Total number of elements.
    pub fn elements(&self) -> usize {
        self.lens.iter().product()
    }

    /// Flat buffer offset of a multi-index.
    pub fn index(&self, idx: &[usize]) -> usize {
        debug_assert_eq!(idx.len(), self.lens.len());
        idx.iter()
            .zip(self.strides.iter())
            .map(|(i, stride)| i * stride)
            .sum()
    }

    /// A static copy where every extent is at least `min`.
    pub fn to_static(&self, min: usize) -> Shape {
        Shape::new(
            self.elem_type,
            self.lens.iter().map(|&l| l.max(min)).collect(),
        )
    }

    /// Visit every multi-index in row-major order together with its running
    /// flat position.
    pub fn for_each(&self, mut f: impl FnMut(&[usize], usize)) {
        if self.lens.contains(&0) {
            return;
        }
        let mut idx = vec![0usize; self.lens.len()];
        for flat in 0..self.elements() {
            f(&idx, flat);
            for axis in (0..idx.len()).rev() {
                idx[axis] += 1;
                if idx[axis] < self.lens[axis] {
                    break;
                }
                idx[axis] = 0;
            }
        }
    }
}
