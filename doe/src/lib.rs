/*!
Design of experiments (DoE) used to seed surrogate models and to scan
acquisition functions.

A DoE is a set of points drawn within a sample space `xlimits` given as a
`(nx, 2)` array where the ith row is `[lower bound, upper bound]` of the
ith component of the samples.

```
use egolearn_doe::{FullFactorial, Lhs, LhsKind, SamplingMethod};
use ndarray::arr2;
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

let xlimits = arr2(&[[5., 10.], [0., 1.]]);
// Five samples with a centered Latin Hypercube
let samples = Lhs::new(&xlimits).kind(LhsKind::Centered).sample(5);
assert_eq!(samples.dim(), (5, 2));
// a regular 3x3 grid
let grid = FullFactorial::new(&xlimits).sample(9);
assert_eq!(grid.nrows(), 9);
// reproducible maximin Latin Hypercube
let samples = Lhs::new(&xlimits)
    .with_rng(Xoshiro256Plus::seed_from_u64(42))
    .sample(5);
assert_eq!(samples.nrows(), 5);
```
*/
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod full_factorial;
mod lhs;
mod traits;
mod utils;

pub use full_factorial::*;
pub use lhs::*;
pub use traits::*;
pub use utils::pdist;
