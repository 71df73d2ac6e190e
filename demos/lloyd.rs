use kmeans_engine::*;
use rand::prelude::*;

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();
    let (sample_cnt, sample_dims, k, max_iter) = (20000, 8, 4, 100);

    // Generate some random data
    let mut rnd = StdRng::seed_from_u64(1337);
    let points: Vec<Vec<f64>> = (0..sample_cnt)
        .map(|_| (0..sample_dims).map(|_| rnd.gen_range(0.0..1.0)).collect())
        .collect();

    // Calculate kmeans, using kmean++ as initialization-method
    let conf = KMeansConfig::build().random_seed(42).build();
    let result = kmeans(&points, k, max_iter, InitMethod::KMeansPlusPlus, &conf)?;

    println!("Centroids: {:?}", result.centroids);
    println!("Cluster sizes: {:?}", result.centroid_frequency);
    println!("Iterations: {}", result.iterations);
    println!("Inertia: {}", result.distsum);
    Ok(())
}
