pub mod allocation;

pub use allocation::{
    allocate_payment, preview_allocation, AllocationInput, AllocationLine, AllocationPreview,
    RepaymentAllocation,
};
