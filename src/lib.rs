//! Type-indexed properties attached to arbitrary hosts from the outside.
//!
//! A host is anything with a hashable key. Each host owns a bucket of slots,
//! one per [`TypeTag`](props::type_tag::TypeTag); the bucket is created the
//! first time the host is looked up, and a slot that was never written reads
//! as the value type's default.
//!
//! ```
//! use host_props::props::accessor::BasicAccessor;
//!
//! struct Health;
//!
//! let props: BasicAccessor<u32, i32> = BasicAccessor::new();
//! props.set::<Health>(1, 5);
//! assert_eq!(props.get::<Health>(1), 5);
//! assert_eq!(props.get::<Health>(2), 0);
//! ```

pub mod props;
pub mod utils;

pub use props::{
    accessor::{Accessor, BasicAccessor, HostSlot},
    config::MapConfig,
    error::{AccessorError, Result},
    instance_map::InstanceMap,
    reference_map::ReferenceMap,
    type_tag::TypeTag,
    Bucket, NewBucket,
};
