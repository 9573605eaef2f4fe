//! Closed-form safety distances and overtaking-time prediction.
//!
//! All functions are pure: inputs are sensor facts for the current tick,
//! outputs are metres or seconds.  An unreachable configuration (zero
//! acceleration, zero relative speed, zero lateral speed) yields
//! `f64::INFINITY` rather than an error.

use pt_core::{Direction, OvertakingParams};

/// Distance the platoon must keep to a non-platooning vehicle ahead.
///
/// `time_headway · speed`, inflated by the oscillation margin while not in a
/// lane change.
pub fn safety_dist_platoon(
    time_headway:   f64,
    speed:          f64,
    in_lane_change: bool,
    params:         &OvertakingParams,
) -> f64 {
    let d = time_headway * speed;
    if in_lane_change { d } else { d * params.oscillation_factor() }
}

/// Safety gap of the (non-platooning) vehicle being overtaken.
#[inline]
pub fn safety_dist_slower(v_slower: f64, params: &OvertakingParams) -> f64 {
    params.truck_min_gap.max(params.truck_headway * v_slower)
}

/// Minimum gap to a vehicle in the rear area so that it brakes at most with
/// `accel` (≤ 0).
///
/// ```text
/// v_r > v_p and a < 0 :  -(1/2a)(v_p − v_r)² + v_r·T_react + v_p·T_gap
/// v_r ≤ v_p and a ≤ 0 :  v_r·(T_react + T_gap)
/// otherwise           :  ∞
/// ```
///
/// Floored at `truck_min_gap` when maneuvering right; inflated by the
/// oscillation margin while not in a lane change.
pub fn min_rear_gap(
    accel:          f64,
    v_platoon:      f64,
    v_rear:         f64,
    direction:      Direction,
    in_lane_change: bool,
    params:         &OvertakingParams,
) -> f64 {
    let t_r = params.reaction_time;
    let t_g = params.time_gap;
    let mut d = if v_rear > v_platoon && accel < 0.0 {
        (-1.0 / (2.0 * accel)) * (v_platoon - v_rear).powi(2) + v_rear * t_r + v_platoon * t_g
    } else if v_rear <= v_platoon && accel <= 0.0 {
        v_rear * (t_r + t_g)
    } else {
        f64::INFINITY
    };
    if direction == Direction::Right {
        d = d.max(params.truck_min_gap);
    }
    if !in_lane_change {
        d *= params.oscillation_factor();
    }
    d
}

/// Platoon-side inputs of [`predicted_overtaking_time`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PassGeometry {
    /// Current platoon speed.
    pub speed:                     f64,
    pub max_accel:                 f64,
    pub max_lateral_speed:         f64,
    /// Lateral distance back to the original lane (return trip only).
    pub distance_to_original_lane: f64,
    /// Leader front bumper to last member rear bumper.
    pub platoon_length:            f64,
    /// Result of [`safety_dist_platoon`] for this tick.
    pub safety_dist:               f64,
    pub direction:                 Direction,
}

/// Seconds needed to pass a maximum-length truck at `dist_slower` metres
/// driving `v_slower`, with `v_max_lane` reachable on the passing lane.
///
/// On the return trip the distance shrinks by what the platoon gains while
/// changing back and settling in the original lane; a distance already
/// inside the safety distance gives `0`.
pub fn predicted_overtaking_time(
    geo:         &PassGeometry,
    v_max_lane:  f64,
    v_slower:    f64,
    dist_slower: f64,
    params:      &OvertakingParams,
) -> f64 {
    if geo.max_lateral_speed <= 0.0 {
        return f64::INFINITY;
    }
    let a = geo.max_accel;
    let v_p = geo.speed;

    let mut dist = dist_slower;
    if geo.direction == Direction::Right {
        let t_lane_change = geo.distance_to_original_lane / geo.max_lateral_speed
            + params.time_stay_in_original_lane;
        dist -= (v_p - v_slower) * t_lane_change;
    }
    if dist < geo.safety_dist {
        return 0.0;
    }

    let l_total = dist
        + params.truck_max_length
        + safety_dist_slower(v_slower, params)
        + geo.platoon_length;
    let root = ((v_p - v_slower).powi(2) + 2.0 * a * l_total).sqrt();
    let v_over = v_slower + root;

    let t_pass = if v_over <= v_max_lane {
        if a == 0.0 {
            return f64::INFINITY;
        }
        (v_slower - v_p + root) / a
    } else {
        let rel = v_max_lane - v_slower;
        let accel_term = 2.0 * a * l_total;
        if rel == 0.0 || accel_term == 0.0 {
            return f64::INFINITY;
        }
        (l_total / rel) * (1.0 + (v_max_lane - v_p).powi(2) / accel_term)
    };

    t_pass + params.lane_width / geo.max_lateral_speed
}
