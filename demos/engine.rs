use kmeans_engine::*;
use rand::prelude::*;

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    // Three noisy blobs in the plane
    let mut rnd = StdRng::seed_from_u64(7);
    let mut points = PointSet::new(2)?;
    for center in [[0.0f64, 0.0], [4.0, 4.0], [8.0, 0.0]] {
        for _ in 0..50 {
            points.append(&[center[0] + rnd.gen_range(-1.0..1.0), center[1] + rnd.gen_range(-1.0..1.0)])?;
        }
    }

    let mut engine = ClusteringEngine::new(&points, 3, None, &mut rnd)?;
    for step in 1..=20 {
        let converged = engine.step()?;
        let centroids: Vec<String> = engine.clusters().iter().map(ToString::to_string).collect();
        println!("Step {:2} | inertia {:8.3} | {}", step, engine.inertia(), centroids.join(" "));
        if converged {
            break;
        }
    }

    for (i, cluster) in engine.clusters().iter().enumerate() {
        println!("Cluster {}: {} points around {}", i, cluster.members().len(), cluster);
    }
    Ok(())
}
