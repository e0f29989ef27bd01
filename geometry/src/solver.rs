//! Gauss-Jordan elimination for rectangular systems `A·x = v` with at least as many unknowns
//! as equations.

/// Pivot candidates with a magnitude at or below this are treated as zero.
pub const PIVOT_EPSILON: f64 = 1e-12;

/// Denominators of the projective ratio constraint below this make the solve fail.
pub const RATIO_EPSILON: f64 = 1e-6;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SolutionKind {
    Unique,
    Ambiguous,
    NoSolution,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Solution<T> {
    Unique(T),
    /// Free unknowns were set to zero.
    Ambiguous(T),
    NoSolution,
}

impl<T> Solution<T> {
    pub fn kind(&self) -> SolutionKind {
        match self {
            Solution::Unique(_) => SolutionKind::Unique,
            Solution::Ambiguous(_) => SolutionKind::Ambiguous,
            Solution::NoSolution => SolutionKind::NoSolution,
        }
    }

    /// The solution, whether unique or not.
    pub fn value(self) -> Option<T> {
        match self {
            Solution::Unique(v) | Solution::Ambiguous(v) => Some(v),
            Solution::NoSolution => None,
        }
    }

    pub fn unique(self) -> Option<T> {
        match self {
            Solution::Unique(v) => Some(v),
            Solution::Ambiguous(_) | Solution::NoSolution => None,
        }
    }

    pub fn map<R>(self, f: impl FnOnce(T) -> R) -> Solution<R> {
        match self {
            Solution::Unique(v) => Solution::Unique(f(v)),
            Solution::Ambiguous(v) => Solution::Ambiguous(f(v)),
            Solution::NoSolution => Solution::NoSolution,
        }
    }
}

/// Forces one unknown.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pin {
    pub index: usize,
    pub value: f64,
    /// Interpret `value` as the ratio `x[index] / x[T-1]`, where the last unknown is the
    /// homogeneous weight, instead of the value of `x[index]` itself.
    pub projective: bool,
}

impl Pin {
    pub fn value(index: usize, value: f64) -> Self {
        Self {
            index,
            value,
            projective: false,
        }
    }

    pub fn ratio(index: usize, value: f64) -> Self {
        Self {
            index,
            value,
            projective: true,
        }
    }
}

/// Solve `a·x = v` by Gauss-Jordan elimination.
///
/// Row by row, the pivot is the column with the largest magnitude that is neither pinned nor
/// claimed by an earlier row. Unknowns that end up neither pivot nor pinned are free and set to
/// zero, which makes the solution [`Solution::Ambiguous`].
///
/// The inputs are not modified, so a caller may retry with a different pin.
pub fn gauss_jordan<const S: usize, const T: usize>(
    a: &[[f64; T]; S],
    v: &[f64; S],
    pin: Option<Pin>,
) -> Solution<[f64; T]> {
    let mut b = *a;
    let mut w = *v;
    let mut pivots = [0usize; S];
    let pinned = pin.map(|p| p.index);

    if let Some(pin) = pin {
        debug_assert!(pin.index < T, "Pinned unknown {} out of range", pin.index);
        if pin.index >= T || (pin.projective && pin.index == T - 1) {
            return Solution::NoSolution;
        }
    }

    for row in 0..S {
        let Some(col) = find_pivot(&b[row], &pivots[..row], pinned) else {
            return Solution::NoSolution;
        };
        pivots[row] = col;

        let p = b[row][col];
        for c in 0..T {
            b[row][c] /= p;
        }
        w[row] /= p;

        for other in 0..S {
            if other == row {
                continue;
            }
            let factor = b[other][col];
            if factor == 0.0 {
                continue;
            }
            for c in 0..T {
                b[other][c] -= factor * b[row][c];
            }
            w[other] -= factor * w[row];
        }
    }

    // Every row now reads x[pivots[row]] + Σ b[row][free] · x[free] = w[row].
    let mut x = [0.0; T];
    let mut pinned_value = 0.0;

    if let Some(pin) = pin {
        pinned_value = if pin.projective {
            let Some(k) = pivots.iter().position(|&c| c == T - 1) else {
                return Solution::NoSolution;
            };
            // x[T-1] = w[k] - b[k][i]·x[i] and x[i] = value·x[T-1].
            let denominator = 1.0 + pin.value * b[k][pin.index];
            if denominator.abs() < RATIO_EPSILON {
                return Solution::NoSolution;
            }
            pin.value * w[k] / denominator
        } else {
            pin.value
        };
        x[pin.index] = pinned_value;
    }

    for row in 0..S {
        let coupling = pinned.map(|i| b[row][i] * pinned_value).unwrap_or(0.0);
        x[pivots[row]] = w[row] - coupling;
    }

    let constrained = S + usize::from(pin.is_some());
    if constrained == T {
        Solution::Unique(x)
    } else {
        Solution::Ambiguous(x)
    }
}

fn find_pivot(row: &[f64], claimed: &[usize], pinned: Option<usize>) -> Option<usize> {
    row.iter()
        .enumerate()
        .filter(|(col, _)| !claimed.contains(col) && pinned != Some(*col))
        .map(|(col, value)| (col, value.abs()))
        .filter(|(_, magnitude)| *magnitude > PIVOT_EPSILON)
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(col, _)| col)
}
