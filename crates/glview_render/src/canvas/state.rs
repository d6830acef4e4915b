//! Transform/alpha state stack shared by canvas implementations.

use glview_core::Matrix;

/// Selects which parts of the state [`StateStack::save_with`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SaveFlags(u8);

impl SaveFlags {
    /// Save the current alpha.
    pub const ALPHA: Self = Self(0x01);
    /// Save the current matrix.
    pub const MATRIX: Self = Self(0x02);
    /// Save everything.
    pub const ALL: Self = Self(0xFF);

    /// Returns true if every flag in `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of two flag sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct Saved {
    alpha: Option<f32>,
    matrix: Option<Matrix>,
}

/// Current alpha and matrix plus a LIFO of saved states.
#[derive(Debug, Clone)]
pub struct StateStack {
    alpha: f32,
    matrix: Matrix,
    saved: Vec<Saved>,
}

impl Default for StateStack {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStack {
    /// Creates a stack at identity with full alpha.
    #[must_use]
    pub fn new() -> Self {
        Self {
            alpha: 1.0,
            matrix: Matrix::IDENTITY,
            saved: Vec::with_capacity(16),
        }
    }

    /// Returns the current alpha.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Sets the current alpha.
    ///
    /// # Panics
    ///
    /// Panics if `alpha` is outside `[0, 1]`.
    pub fn set_alpha(&mut self, alpha: f32) {
        assert!((0.0..=1.0).contains(&alpha), "alpha out of range: {alpha}");
        self.alpha = alpha;
    }

    /// Multiplies the current alpha.
    ///
    /// # Panics
    ///
    /// Panics if `alpha` is outside `[0, 1]`.
    pub fn multiply_alpha(&mut self, alpha: f32) {
        assert!((0.0..=1.0).contains(&alpha), "alpha out of range: {alpha}");
        self.alpha *= alpha;
    }

    /// Returns the current matrix.
    #[must_use]
    pub fn matrix(&self) -> Matrix {
        self.matrix
    }

    /// Replaces the current matrix.
    pub fn set_matrix(&mut self, matrix: Matrix) {
        self.matrix = matrix;
    }

    /// Pre-concatenates a translation.
    pub fn translate(&mut self, x: f32, y: f32) {
        self.matrix.pre_translate(x, y);
    }

    /// Pre-concatenates a scale.
    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.matrix.pre_scale(sx, sy);
    }

    /// Pre-concatenates a rotation in degrees.
    pub fn rotate(&mut self, degrees: f32) {
        if degrees != 0.0 {
            self.matrix.pre_rotate(degrees);
        }
    }

    /// Pre-concatenates an arbitrary transform.
    pub fn concat(&mut self, other: &Matrix) {
        self.matrix = self.matrix.concat(other);
    }

    /// Pushes the parts of the state selected by `flags`.
    pub fn save_with(&mut self, flags: SaveFlags) {
        self.saved.push(Saved {
            alpha: flags.contains(SaveFlags::ALPHA).then_some(self.alpha),
            matrix: flags.contains(SaveFlags::MATRIX).then_some(self.matrix),
        });
    }

    /// Pops the last saved state.
    ///
    /// # Panics
    ///
    /// Panics if there is no matching save.
    pub fn restore(&mut self) {
        let Some(saved) = self.saved.pop() else {
            panic!("restore() called without a matching save()");
        };
        if let Some(alpha) = saved.alpha {
            self.alpha = alpha;
        }
        if let Some(matrix) = saved.matrix {
            self.matrix = matrix;
        }
    }

    /// Number of saved states.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Drops all saved states and returns to identity with full alpha.
    pub fn reset(&mut self) {
        self.saved.clear();
        self.alpha = 1.0;
        self.matrix = Matrix::IDENTITY;
    }
}
