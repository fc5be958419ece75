use autodrive_shared::*;

/// Advance vehicle state and pose by one tick under the configured model.
pub fn step(
    vehicle: &mut VehicleState,
    pose: &mut AgentPose,
    action: &Action,
    cfg: &SimConfig,
    dt: f32,
) {
    match cfg.dynamics {
        DynamicsModel::Kinematic => step_kinematic(vehicle, pose, action, cfg, dt),
        DynamicsModel::ConstantForce => step_constant_force(vehicle, pose, action, cfg, dt),
    }
}

/// Scalar-speed kinematic model. Natural decay is applied before throttle;
/// the handbrake is applied after throttle, so braking can cancel the same
/// tick's acceleration.
pub fn step_kinematic(
    vehicle: &mut VehicleState,
    pose: &mut AgentPose,
    action: &Action,
    cfg: &SimConfig,
    dt: f32,
) {
    vehicle.speed *= cfg.natural_decay;
    apply_throttle(vehicle, action.throttle, cfg, dt);
    apply_steering(vehicle, action.steer, cfg, dt);
    apply_brake(vehicle, action.brake, cfg);
    integrate(vehicle, pose, dt);
}

fn apply_throttle(vehicle: &mut VehicleState, input: f32, cfg: &SimConfig, dt: f32) {
    if input > 0.0 {
        // Nonlinear response, saturating as speed approaches the maximum.
        let response = input.abs().powf(1.5);
        let headroom = (1.0 - vehicle.speed / cfg.max_speed).clamp(0.0, 1.0);
        let accel = response * cfg.acceleration_rate * headroom * dt;
        vehicle.speed += accel;
        vehicle.acceleration = accel / dt;
    } else if input < 0.0 {
        // Linear reverse at half rate.
        let accel = input * (cfg.acceleration_rate / 2.0) * dt;
        vehicle.speed += accel;
        vehicle.acceleration = accel / dt;
    } else {
        // Coasting: natural decay only, no artificial deceleration.
        vehicle.acceleration = 0.0;
    }
    vehicle.speed = vehicle.speed.clamp(-cfg.max_speed / 2.0, cfg.max_speed);
}

fn apply_steering(vehicle: &mut VehicleState, input: f32, cfg: &SimConfig, dt: f32) {
    vehicle.steering_delta = input * cfg.steering_rate * dt;
    // Steering authority scales with speed and vanishes at standstill.
    let authority = (vehicle.speed / cfg.max_speed).clamp(0.0, 1.0);
    vehicle.steering_angle += vehicle.steering_delta * authority;
    vehicle.steering_angle = vehicle
        .steering_angle
        .clamp(-cfg.max_steering_angle, cfg.max_steering_angle);
}

fn apply_brake(vehicle: &mut VehicleState, input: f32, cfg: &SimConfig) {
    if input > 0.5 {
        vehicle.speed *= cfg.handbrake_decay;
        vehicle.acceleration = 0.0;
    }
}

fn integrate(vehicle: &mut VehicleState, pose: &mut AgentPose, dt: f32) {
    // Position advances along the previous heading, then the heading is set
    // directly from the accumulated steering angle.
    pose.position += pose.forward() * vehicle.speed * dt;
    pose.heading = vehicle.steering_angle;
}

/// Velocity-vector model applying a constant accelerating force along the
/// heading. No steering clamp and no speed-scaled authority; kept as the
/// alternative integration strategy.
pub fn step_constant_force(
    vehicle: &mut VehicleState,
    pose: &mut AgentPose,
    action: &Action,
    cfg: &SimConfig,
    dt: f32,
) {
    if action.throttle != 0.0 {
        let push = pose.forward() * action.throttle * cfg.acceleration_rate * dt;
        vehicle.velocity += push;
        vehicle.acceleration = action.throttle * cfg.acceleration_rate;
    } else {
        vehicle.acceleration = 0.0;
    }
    vehicle.velocity = vehicle.velocity.clamp_length_max(cfg.max_speed);

    if action.steer != 0.0 {
        pose.heading += action.steer * cfg.steering_rate * dt;
    }
    if action.brake > 0.5 {
        vehicle.velocity *= cfg.handbrake_decay;
        vehicle.acceleration = 0.0;
    }

    pose.position += vehicle.velocity * dt;
    vehicle.speed = vehicle.velocity.dot(pose.forward());
}
