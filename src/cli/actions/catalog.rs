use crate::{
    cli::actions::navigate::{enter, report},
    features::movies::Movie,
    MagicStream,
};
use anyhow::Result;

pub async fn movies(client: &MagicStream) -> Result<()> {
    let movies = client.catalog().movies().await.map_err(report)?;
    print_movies(&movies);
    Ok(())
}

pub async fn genres(client: &MagicStream) -> Result<()> {
    let genres = client.catalog().genres().await.map_err(report)?;
    for genre in genres {
        println!("{}\t{}", genre.genre_id, genre.genre_name);
    }
    Ok(())
}

pub async fn recommended(client: &MagicStream) -> Result<()> {
    enter(client, "/recommended")?;
    let movies = client.catalog().recommended().await.map_err(report)?;
    print_movies(&movies);
    Ok(())
}

pub async fn movie(client: &MagicStream, imdb_id: &str) -> Result<()> {
    enter(client, &format!("/movie/{imdb_id}"))?;
    let movie = client.catalog().movie(imdb_id).await.map_err(report)?;

    println!("{} ({})", movie.title, movie.imdb_id);
    println!("Genres: {}", genre_names(&movie));
    if !movie.ranking.ranking_name.is_empty() {
        println!("Ranking: {}", movie.ranking.ranking_name);
    }
    if !movie.youtube_id.is_empty() {
        println!("Trailer: https://www.youtube.com/watch?v={}", movie.youtube_id);
    }
    if !movie.admin_review.is_empty() {
        println!("Review: {}", movie.admin_review);
    }
    Ok(())
}

pub async fn review(client: &MagicStream, imdb_id: &str, text: &str) -> Result<()> {
    enter(client, &format!("/review/{imdb_id}"))?;
    let saved = client
        .catalog()
        .submit_review(imdb_id, text)
        .await
        .map_err(report)?;

    println!("Review saved. Ranking: {}", saved.ranking_name);
    Ok(())
}

fn print_movies(movies: &[Movie]) {
    if movies.is_empty() {
        println!("No movies found.");
        return;
    }

    for movie in movies {
        println!(
            "{}\t{}\t{}\t{}",
            movie.imdb_id,
            movie.title,
            genre_names(movie),
            movie.ranking.ranking_name
        );
    }
}

fn genre_names(movie: &Movie) -> String {
    movie
        .genre
        .iter()
        .map(|genre| genre.genre_name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
