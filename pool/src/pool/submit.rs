use crate::{errors::PoolError, storage::{Address, Ledger}};

use super::{
    actions::{build_actions_from_request, Request},
    health_factor::PositionData,
    pool::Pool,
};

/// Execute a set of updates for a user against the pool as one atomic transition.
///
/// ### Arguments
/// * caller - The address sending tokens to the pool and receiving tokens from it
/// * on_behalf_of - The address of the user whose positions are being modified
/// * requests - A vec of requests to be processed
///
/// ### Returns
/// The amount each request moved
///
/// ### Errors
/// If the requests are unable to be fully executed. The ledger is left unchanged.
pub fn execute_submit(
    ledger: &mut Ledger,
    caller: &Address,
    on_behalf_of: &Address,
    requests: &[Request],
) -> Result<Vec<u128>, PoolError> {
    if requests.is_empty() {
        return Err(PoolError::BadRequest);
    }
    let mut pool = Pool::load(ledger);

    let (actions, new_state, check_health, amounts) =
        build_actions_from_request(ledger, &mut pool, caller, on_behalf_of, requests)?;

    if check_health {
        PositionData::calculate_from_positions(ledger, &mut pool, &new_state)?
            .require_healthy(on_behalf_of)?;
    }

    pool.commit(ledger, actions, &[new_state])?;
    Ok(amounts)
}
