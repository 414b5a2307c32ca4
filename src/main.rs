use std::process;
use std::time::Instant;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use rayon::prelude::*;
use thiserror::Error;

use slabtrace::aabb::Aabb;
use slabtrace::bvh::Bvh;
use slabtrace::config::Config;
use slabtrace::error::BvhError;
use slabtrace::hittable::{HitRecord, Hittable};
use slabtrace::interval::Interval;
use slabtrace::ray::Ray;
use slabtrace::{random, scene};

mod cli;
mod logger;

use cli::Args;
use logger::init_logger;

/// Ray origins are drawn from the scene bounds clipped to this cube.
const ORIGIN_LIMIT: Interval = Interval::new(-30.0, 30.0);

/// Relative tolerance when comparing BVH and brute-force distances.
const T_TOLERANCE: f32 = 1e-5;

/// Mismatches logged individually before only the total is reported.
const MAX_REPORTED_MISMATCHES: usize = 10;

/// Reasons a run ends unsuccessfully.
#[derive(Debug, Error)]
enum RunError {
    #[error("failed to build BVH: {0}")]
    Build(#[from] BvhError),

    #[error("BVH disagreed with brute force on {0} rays")]
    Mismatch(usize),
}

fn main() {
    let args = Args::parse();

    init_logger(args.debug_level.clone().into());

    info!("slabtrace - Git Version {} ({})", env!("GIT_HASH"), env!("GIT_DATE"));

    let config = match Config::resolve(args.config.as_deref()) {
        Ok(config) => args.apply(config),
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };
    if let Err(e) = config.validate() {
        error!("{e}");
        process::exit(1);
    }

    if let Err(e) = run(&config) {
        error!("{e}");
        process::exit(1);
    }
}

/// Build the configured scene, trace the ray batch through the BVH and,
/// when enabled, through the linear list as well.
///
/// Fails when the tree cannot be built or any ray's answers differ.
fn run(config: &Config) -> Result<(), RunError> {
    let mut rng = random::seeded(config.seed);

    let objects = scene::build(config.scene, &mut rng, config.objects);
    info!("Scene {:?}: {} primitives", config.scene, objects.len());

    let build_start = Instant::now();
    let bvh = Bvh::new(objects.clone())?;
    info!(
        "BVH built in {:.2?}: {} nodes, depth {}",
        build_start.elapsed(),
        bvh.node_count(),
        bvh.depth()
    );

    let region = origin_region(&bvh.root_box());
    let rays: Vec<Ray> = (0..config.rays)
        .map(|_| random::random_ray(&mut rng, &region))
        .collect();
    let ray_t = Interval::new(config.t_min, f32::INFINITY);

    info!("Tracing {} rays using {} CPU cores...", rays.len(), rayon::current_num_threads());
    let (bvh_hits, bvh_time) = trace("BVH", &bvh, &rays, ray_t);
    let hit_count = bvh_hits.iter().flatten().count();
    info!(
        "BVH: {:.2?} ({:.0} rays/s), {} hits",
        bvh_time,
        rays.len() as f64 / bvh_time.as_secs_f64(),
        hit_count
    );

    if !config.verify {
        return Ok(());
    }

    let list = scene::to_list(&objects);
    let (list_hits, list_time) = trace("Brute force", &list, &rays, ray_t);
    info!(
        "Brute force: {:.2?}, BVH speedup {:.1}x",
        list_time,
        list_time.as_secs_f64() / bvh_time.as_secs_f64()
    );

    let mut mismatches = 0;
    for (i, (from_tree, from_list)) in bvh_hits.iter().zip(&list_hits).enumerate() {
        if same_hit(from_tree.as_ref(), from_list.as_ref()) {
            continue;
        }
        mismatches += 1;
        if mismatches <= MAX_REPORTED_MISMATCHES {
            warn!(
                "Ray {i} {:?}: BVH t={:?}, brute force t={:?}",
                rays[i],
                from_tree.map(|rec| rec.t),
                from_list.map(|rec| rec.t)
            );
        }
    }

    if mismatches > 0 {
        return Err(RunError::Mismatch(mismatches));
    }
    info!("All {} rays agree with brute force", rays.len());
    Ok(())
}

/// Query `world` with every ray in parallel, returning answers in ray order.
fn trace(
    label: &str,
    world: &dyn Hittable,
    rays: &[Ray],
    ray_t: Interval,
) -> (Vec<Option<HitRecord>>, std::time::Duration) {
    let pb = ProgressBar::new(rays.len() as u64);
    let style = ProgressStyle::default_bar()
        .template("{msg:12} {bar:40} {pos}/{len} ETA: {eta}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.set_message(label.to_string());

    let start = Instant::now();
    let hits: Vec<Option<HitRecord>> = rays
        .par_iter()
        .map(|r| {
            let hit = world.hit(r, ray_t);
            pb.inc(1);
            hit
        })
        .collect();
    let elapsed = start.elapsed();

    pb.finish_and_clear();
    (hits, elapsed)
}

/// Scene bounds clipped to [`ORIGIN_LIMIT`] on every axis.
fn origin_region(bounds: &Aabb) -> Aabb {
    let clip = |axis: Interval| Interval::new(ORIGIN_LIMIT.clamp(axis.min), ORIGIN_LIMIT.clamp(axis.max));
    Aabb::new(clip(bounds.x), clip(bounds.y), clip(bounds.z))
}

/// Both missed, or both hit at the same distance within tolerance.
fn same_hit(a: Option<&HitRecord>, b: Option<&HitRecord>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => (a.t - b.t).abs() <= T_TOLERANCE * a.t.abs().max(1.0),
        _ => false,
    }
}
