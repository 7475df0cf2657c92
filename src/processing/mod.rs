//! The three stage engines.
//!
//! Each engine takes a [`crate::types::Table`] and the raw stage expression, infers cell types
//! with [`crate::types::Scalar::infer`] as it goes, and returns a new value without touching its
//! input:
//!
//! - [`filter()`]: keep rows matching `column OP value`
//! - [`sort()`]: order rows by `column=asc|desc`
//! - [`aggregate()`]: reduce a numeric column with `column=avg|min|max`
//!
//! ## Example: filter → sort → aggregate
//!
//! ```rust
//! use csv_processor::ingestion::load_csv_from_str;
//! use csv_processor::processing::{aggregate, filter, sort};
//!
//! let table = load_csv_from_str(
//!     "name,brand,price\niphone,apple,999\nredmi,xiaomi,199\ngalaxy,samsung,1199\n",
//!     b',',
//! )
//! .unwrap();
//!
//! let expensive = filter(&table, "price>500").unwrap();
//! let ordered = sort(&expensive, "price=desc").unwrap();
//! assert_eq!(ordered.column_values("name").unwrap(), vec!["galaxy", "iphone"]);
//!
//! let avg = aggregate(&ordered, "price=avg").unwrap();
//! assert_eq!(avg, 1099.0);
//! ```

pub mod aggregate;
pub mod filter;
pub mod sort;

pub use aggregate::{aggregate, aggregate_by};
pub use filter::{filter, filter_by};
pub use sort::{sort, sort_by};
