//! Symmetry propagation.
//!
//! Starting from the pairs already found, walk outward through the two
//! drain nets of each pair. Unclaimed devices of the same kind and size
//! hanging off those nets through the same pin role are paired, and every
//! new pair is walked in turn (breadth first).

use std::collections::{BTreeSet, VecDeque};

use super::detector::Matching;
use crate::circuit::{Device, Endpoint, PinRole};

pub(super) fn run<'c>(matching: &mut Matching<'c>) -> usize {
    let circuit = matching.circuit();

    let mut queue: VecDeque<(&'c Device, &'c Device)> = matching
        .pairs()
        .iter()
        .filter_map(|p| Some((circuit.device(&p.first)?, circuit.device(&p.second)?)))
        .collect();
    let mut visited: BTreeSet<(&str, &str)> = BTreeSet::new();
    let mut claimed = 0;

    while let Some((left, right)) = queue.pop_front() {
        let key = if left.id <= right.id {
            (left.id.as_str(), right.id.as_str())
        } else {
            (right.id.as_str(), left.id.as_str())
        };
        if !visited.insert(key) {
            continue;
        }

        let (Some(net_l), Some(net_r)) =
            (left.net_of(PinRole::Drain), right.net_of(PinRole::Drain))
        else {
            continue;
        };
        if net_l == net_r {
            continue;
        }
        let (Some(side_l), Some(side_r)) =
            (circuit.endpoints_of(net_l), circuit.endpoints_of(net_r))
        else {
            continue;
        };

        for ep_l in side_l.iter().filter(|ep| ep.device != left.id) {
            let Some((dev_l, role_l)) = resolve(matching, ep_l) else {
                continue;
            };
            let twin = side_r
                .iter()
                .filter(|ep| ep.device != right.id && ep.device != dev_l.id)
                .filter_map(|ep| resolve(matching, ep))
                .find(|(dev_r, role_r)| *role_r == role_l && dev_r.same_geometry(dev_l));

            if let Some((dev_r, _)) = twin {
                if matching.claim_pair(&dev_l.id, &dev_r.id) {
                    claimed += 2;
                    queue.push_back((dev_l, dev_r));
                }
            }
        }
    }
    claimed
}

/// The unclaimed device behind an endpoint and the role of its pin.
fn resolve<'c>(matching: &Matching<'c>, endpoint: &Endpoint) -> Option<(&'c Device, PinRole)> {
    if !matching.is_free(&endpoint.device) {
        return None;
    }
    let device = matching.circuit().device(&endpoint.device)?;
    let role = PinRole::from_pin_name(&endpoint.pin)?;
    Some((device, role))
}
