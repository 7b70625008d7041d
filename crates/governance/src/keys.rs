// governance/src/keys.rs

//! Store keys owned by the governance module

/// The open funding cycle
pub const CURRENT_CYCLE_KEY: &str = "current_cycle";

const ELIGIBILITY_LIST_PREFIX: &str = "eligibility_list:";

const ELIGIBILITY_RESULT_PREFIX: &str = "eligibility_result:";

/// Details submitted during cycle `cycle_id`
pub fn eligibility_list_key(cycle_id: u64) -> String {
    format!("{}{}", ELIGIBILITY_LIST_PREFIX, cycle_id)
}

/// Ranking and admission outcome of the closed cycle `cycle_id`
pub fn eligibility_result_key(cycle_id: u64) -> String {
    format!("{}{}", ELIGIBILITY_RESULT_PREFIX, cycle_id)
}
