//! Command-line driver for shop simulations.
//!
//! ```text
//! shop_sim                                              # SHOP_* env / .env
//! shop_sim <stations> <chairs> <customers> <service_time_us>
//! shop_sim sweep <stations> <max_chairs> <customers> <service_time_us>
//! ```

use anyhow::{bail, Context};

use shop_monitor::config::SimulationConfig;
use shop_monitor::core::AppResult;
use shop_monitor::runtime::{sweep_capacity, Simulation, SimulationReport};
use shop_monitor::util::init_tracing;

fn parse_arg<T>(value: &str, name: &str) -> AppResult<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse::<T>()
        .with_context(|| format!("{name} must be a non-negative integer, got `{value}`"))
}

fn apply_positional(cfg: &mut SimulationConfig, args: &[String]) -> AppResult<()> {
    let [stations, chairs, customers, service_time] = args else {
        bail!("usage: shop_sim [sweep] <stations> <chairs> <customers> <service_time_us>");
    };
    cfg.shop.station_count = parse_arg(stations, "stations")?;
    cfg.shop.capacity = parse_arg(chairs, "chairs")?;
    cfg.customers = parse_arg(customers, "customers")?;
    cfg.service_time_us = parse_arg(service_time, "service_time_us")?;
    cfg.validate().map_err(anyhow::Error::msg)?;
    Ok(())
}

fn render_report(report: &SimulationReport) -> AppResult<String> {
    Ok(format!(
        "number of seats = {}\n# customers who didn't receive a service = {}\n{}",
        report.capacity,
        report.rejected,
        serde_json::to_string_pretty(report)?
    ))
}

fn print_report(report: &SimulationReport) -> AppResult<()> {
    println!("{}", render_report(report)?);
    Ok(())
}

fn main() -> AppResult<()> {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cfg = SimulationConfig::from_env().map_err(anyhow::Error::msg)?;

    match args.split_first() {
        Some((mode, rest)) if mode == "sweep" => {
            apply_positional(&mut cfg, rest)?;
            let max_chairs = cfg.shop.capacity;
            let reports = sweep_capacity(&cfg, 0..=max_chairs).context("sweep failed")?;
            for report in &reports {
                print_report(report)?;
            }
        }
        Some(_) => {
            apply_positional(&mut cfg, &args)?;
            let report = Simulation::new(cfg)?.run().context("simulation failed")?;
            print_report(&report)?;
        }
        None => {
            let report = Simulation::new(cfg)?.run().context("simulation failed")?;
            print_report(&report)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_monitor::config::{BackendConfig, ShopConfig};

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn test_positional_args_fill_config() {
        let mut cfg = SimulationConfig::default();
        apply_positional(&mut cfg, &args(&["2", "5", "40", "250"])).unwrap();
        assert_eq!(cfg.shop, ShopConfig::new(5, 2));
        assert_eq!(cfg.customers, 40);
        assert_eq!(cfg.service_time_us, 250);
    }

    #[test]
    fn test_wrong_arg_count_prints_usage() {
        let mut cfg = SimulationConfig::default();
        for bad in [&[][..], &["1", "2", "3"][..], &["1", "2", "3", "4", "5"][..]] {
            let err = apply_positional(&mut cfg, &args(bad)).unwrap_err();
            assert!(err.to_string().starts_with("usage: shop_sim"));
        }
        assert_eq!(cfg, SimulationConfig::default());
    }

    #[test]
    fn test_unparsable_arg_names_the_field() {
        let mut cfg = SimulationConfig::default();
        let err = apply_positional(&mut cfg, &args(&["1", "-3", "10", "0"])).unwrap_err();
        assert!(err.to_string().contains("chairs must be a non-negative integer, got `-3`"));

        let err = apply_positional(&mut cfg, &args(&["1", "3", "ten", "0"])).unwrap_err();
        assert!(err.to_string().contains("customers"));
    }

    #[test]
    fn test_zero_stations_rejected() {
        let mut cfg = SimulationConfig::default();
        let err = apply_positional(&mut cfg, &args(&["0", "3", "10", "0"])).unwrap_err();
        assert!(err.to_string().contains("station_count"));
    }

    #[test]
    fn test_sweep_args_reuse_positional_form() {
        let mut cfg = SimulationConfig::default();
        let all = args(&["sweep", "1", "2", "4", "0"]);
        let (mode, rest) = all.split_first().unwrap();
        assert_eq!(mode, "sweep");
        apply_positional(&mut cfg, rest).unwrap();
        cfg.max_arrival_gap_us = 0;

        let reports = sweep_capacity(&cfg, 0..=cfg.shop.capacity).unwrap();
        assert_eq!(reports.len(), 3);
    }

    #[test]
    fn test_report_output_lines() {
        let cfg = SimulationConfig {
            shop: ShopConfig::new(2, 1),
            customers: 3,
            service_time_us: 0,
            max_arrival_gap_us: 0,
            backend: BackendConfig::Monitor,
        };
        let report = Simulation::new(cfg).unwrap().run().unwrap();
        let text = render_report(&report).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("number of seats = 2"));
        assert_eq!(
            lines.next(),
            Some(format!("# customers who didn't receive a service = {}", report.rejected).as_str())
        );
        let json: serde_json::Value = serde_json::from_str(&lines.collect::<Vec<_>>().join("\n")).unwrap();
        assert_eq!(json["customers"], 3);
    }
}
