//! Explicit fixed-step ODE solvers

use nalgebra::SVector;

/// Advances `x` from `t` to `t + dt` with the classical fourth-order Runge-Kutta method.
pub fn rk4_method_step<F, const N: usize>(
    dt: f64,
    t: f64,
    x: SVector<f64, N>,
    dynamics: &F,
) -> SVector<f64, N>
where
    F: Fn(f64, SVector<f64, N>) -> SVector<f64, N>,
{
    let t_mid = t + 0.5 * dt;
    let t_next = t + dt;
    let k1 = dt * dynamics(t, x);
    let k2 = dt * dynamics(t_mid, x + 0.5 * k1);
    let k3 = dt * dynamics(t_mid, x + 0.5 * k2);
    let k4 = dt * dynamics(t_next, x + k3);
    const ONE_BY_SIX: f64 = 1.0 / 6.0;
    let x_delta = ONE_BY_SIX * (k1 + 2.0 * k2 + 2.0 * k3 + k4);
    x + x_delta
}

/// Time of the `i_step` grid point when `[t_begin, t_final]` is split into
/// `n_steps` equal intervals. The last grid point lands exactly on `t_final`.
pub fn uniform_grid_time(t_begin: f64, t_final: f64, n_steps: usize, i_step: usize) -> f64 {
    if n_steps == 0 {
        return t_begin;
    }
    let alpha = (i_step as f64) / (n_steps as f64);
    t_begin + alpha * (t_final - t_begin)
}

/// Runs `n_steps` RK4 steps across `[t_begin, t_final]`, calling `observer`
/// with the time and state at every grid point (including both end points).
/// Returns the final state.
pub fn rk4_simulate_with_observer<F, O, const N: usize>(
    t_begin: f64,
    t_final: f64,
    n_steps: usize,
    x0: SVector<f64, N>,
    dynamics: &F,
    mut observer: O,
) -> SVector<f64, N>
where
    F: Fn(f64, SVector<f64, N>) -> SVector<f64, N>,
    O: FnMut(f64, &SVector<f64, N>),
{
    let mut x = x0;
    observer(t_begin, &x);
    if n_steps == 0 {
        return x;
    }
    let dt = (t_final - t_begin) / (n_steps as f64);
    for i_step in 0..n_steps {
        let t = uniform_grid_time(t_begin, t_final, n_steps, i_step);
        x = rk4_method_step(dt, t, x, dynamics);
        observer(uniform_grid_time(t_begin, t_final, n_steps, i_step + 1), &x);
    }
    x
}

/// Runs `n_steps` RK4 steps across `[t_begin, t_final]` and returns only the final state.
pub fn rk4_simulate<F, const N: usize>(
    t_begin: f64,
    t_final: f64,
    n_steps: usize,
    x0: SVector<f64, N>,
    dynamics: &F,
) -> SVector<f64, N>
where
    F: Fn(f64, SVector<f64, N>) -> SVector<f64, N>,
{
    rk4_simulate_with_observer(t_begin, t_final, n_steps, x0, dynamics, |_, _| {})
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Vector2, Vector4};

    /// Underdamped oscillator `x'' + 2 xi w x' + w^2 x = 0` released from rest at `x = 1`.
    fn damped_oscillator(omega: f64, xi: f64) -> impl Fn(f64, Vector2<f64>) -> Vector2<f64> {
        move |_, state: Vector2<f64>| {
            let x = state[0];
            let v = state[1];
            Vector2::new(v, -omega * omega * x - 2.0 * xi * omega * v)
        }
    }

    fn damped_oscillator_solution(omega: f64, xi: f64, t: f64) -> f64 {
        let omega_d = omega * (1.0 - xi * xi).sqrt();
        let decay = (-xi * omega * t).exp();
        decay * ((omega_d * t).cos() + (xi * omega / omega_d) * (omega_d * t).sin())
    }

    #[test]
    fn test_rk4_matches_damped_oscillator_analytic_soln() {
        let omega = 2.0;
        let t_final = 3.0;
        let n_steps = 500;
        let dt = t_final / (n_steps as f64);

        for &xi in &[0.0, 0.1, 0.6] {
            let dynamics = damped_oscillator(omega, xi);
            let mut state = Vector2::new(1.0, 0.0);
            for i in 0..=n_steps {
                let t = (i as f64) * dt;
                assert_relative_eq!(
                    state[0],
                    damped_oscillator_solution(omega, xi, t),
                    epsilon = 1e-6
                );
                state = rk4_method_step(dt, t, state, &dynamics);
            }
        }
    }

    #[test]
    fn test_rk4_is_fourth_order() {
        // Halving the step should shrink the global error by roughly 2^4.
        let dynamics = damped_oscillator(3.0, 0.0);
        let x0 = Vector2::new(1.0, 0.0);
        let t_final: f64 = 2.0;
        let exact = (3.0 * t_final).cos();

        let err_coarse = (rk4_simulate(0.0, t_final, 50, x0, &dynamics)[0] - exact).abs();
        let err_fine = (rk4_simulate(0.0, t_final, 100, x0, &dynamics)[0] - exact).abs();
        let ratio = err_coarse / err_fine;
        assert!(ratio > 12.0 && ratio < 36.0, "convergence ratio: {}", ratio);
    }

    #[test]
    fn test_observer_sees_every_grid_point() {
        // Two decoupled oscillators packed into a single 4D state.
        let dynamics = |_: f64, x: Vector4<f64>| Vector4::new(x[2], x[3], -x[0], -4.0 * x[1]);
        let mut times = Vec::new();
        let x_final = rk4_simulate_with_observer(
            0.0,
            1.5,
            30,
            Vector4::new(1.0, 1.0, 0.0, 0.0),
            &dynamics,
            |t, _| times.push(t),
        );

        assert_eq!(times.len(), 31);
        assert_eq!(times[0], 0.0);
        assert_eq!(*times.last().unwrap(), 1.5);
        assert_relative_eq!(x_final[0], 1.5_f64.cos(), epsilon = 1e-5);
        assert_relative_eq!(x_final[1], 3.0_f64.cos(), epsilon = 1e-4);
    }

    #[test]
    fn test_zero_steps_returns_initial_state() {
        let dynamics = damped_oscillator(1.0, 0.0);
        let x0 = Vector2::new(0.3, -0.2);
        let mut count = 0;
        let x = rk4_simulate_with_observer(0.0, 1.0, 0, x0, &dynamics, |_, _| count += 1);
        assert_eq!(x, x0);
        assert_eq!(count, 1);
    }
}
