pub mod dates;
pub mod error;
pub mod filter;

pub use dates::{RangeSpec, range_type::RangeType, resolve};
pub use error::{FieldResolutionError, FilterError, Result};
pub use filter::{
    compiler::{CompileContext, CompiledFilter, FilterCompiler, compile},
    field::{FieldCatalog, FieldKind, FieldResolver, ResolvedField},
    period::PeriodData,
    predicate::Predicate,
    tree::{Combinator, FilterGroup, FilterLeaf, FilterNode, LeafKind},
};
