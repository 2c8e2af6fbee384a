//! Network construction for `camden build-network`.

use anyhow::Result;

use fl_core::{DispatchConfig, FleetRng};
use fl_network::{GridSource, Network, NetworkBuilder, Role, SpatialSource, service_area};

use crate::BuildArgs;

/// Stream offsets so the area pick, roles and demands draw independent numbers.
const AREA_STREAM: u64 = 10;
const METADATA_STREAM: u64 = 11;
const DEMAND_STREAM: u64 = 12;

pub fn build(args: &BuildArgs, config: &DispatchConfig) -> Result<Network> {
    let raw = load(args, config.seed)?.build();
    log::info!("raw network for {:?}: {}", args.place, raw.stats());

    let mut master = FleetRng::new(config.seed);
    let mut network = service_area(&raw, args.target_nodes, &mut master.child(AREA_STREAM))?;
    network.ensure_metadata(&mut master.child(METADATA_STREAM), config.segment_capacity_range)?;

    if args.max_demand > 0 {
        let mut rng = master.child(DEMAND_STREAM);
        for id in network.ids_with_role(Role::Customer) {
            let demand: u32 = rng.gen_range(1..=args.max_demand);
            network.set_demand(id, f64::from(demand))?;
        }
    }
    Ok(network)
}

#[cfg(feature = "osm")]
fn load(args: &BuildArgs, seed: u64) -> Result<NetworkBuilder> {
    match &args.osm {
        Some(path) => Ok(fl_network::osm::OsmPbfSource::new(path).load(&args.place)?),
        None => load_grid(args, seed),
    }
}

#[cfg(not(feature = "osm"))]
fn load(args: &BuildArgs, seed: u64) -> Result<NetworkBuilder> {
    load_grid(args, seed)
}

fn load_grid(args: &BuildArgs, seed: u64) -> Result<NetworkBuilder> {
    let source = GridSource { rows: args.rows, cols: args.cols, seed, ..GridSource::default() };
    Ok(source.load(&args.place)?)
}
