//! Query operators.
//!
//! Every operator is a plain function over columns and vectors. The
//! dispatch layer in [`crate::ExecutionContext::execute`] resolves names,
//! takes the table locks, calls one of these and binds the result.
//!
//! | Operator    | Input                          | Output                 |
//! |-------------|--------------------------------|------------------------|
//! | scan        | column or (positions, values)  | positions              |
//! | fetch       | column, positions              | values                 |
//! | aggregate   | column or vector               | int / float / null     |
//! | arithmetic  | two value vectors              | 64-bit values          |
//! | join        | two (values, positions) pairs  | two position vectors   |

mod aggregate;
mod arith;
mod fetch;
mod join;
mod scan;

pub use aggregate::{aggregate_column, aggregate_longs, aggregate_values, Accumulator};
pub use arith::arithmetic;
pub use fetch::fetch;
pub use join::{block_nested_loop_join, JoinOutput};
pub use scan::{choose_strategy, select_column, select_positions, ScanStrategy};
