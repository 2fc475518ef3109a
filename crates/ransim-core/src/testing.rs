use crate::das::{self, Packet};
use crate::frag::FragUser;
use crate::types::{ServiceClass, UserId};
use crate::units::Bandwidth;

/// A DAS user whose queue holds `(size, remaining)` packets, oldest first.
pub(crate) fn das_user(class: ServiceClass, packets: &[(f64, i64)]) -> das::User {
    let mut user = das::User::new(UserId::new(0), class, 10.0);
    user.queue = packets
        .iter()
        .map(|&(size, remaining)| Packet::new(size, remaining))
        .collect();
    user
}

/// Fragmentation-aware users with fixed demands and deadlines, in the given order.
pub(crate) fn frag_users(specs: &[(ServiceClass, u64, u64)]) -> Vec<FragUser> {
    specs
        .iter()
        .enumerate()
        .map(|(i, &(class, demand, deadline))| {
            FragUser::new(UserId::new(i), class, Bandwidth::new(demand), deadline)
        })
        .collect()
}
