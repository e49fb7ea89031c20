//! Demo data: a handful of Korean releases with random reviews

use crate::api::{ApiClient, MovieDraft, Result, ReviewDraft};
use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use tracing::{debug, info};

/// A demo movie
#[derive(Debug, Clone, Copy)]
pub struct SeedMovie {
    pub title: &'static str,
    /// Year, month, day
    pub released: (i32, u32, u32),
    pub director: &'static str,
    pub genre: &'static str,
    pub poster_url: &'static str,
}

impl SeedMovie {
    pub fn draft(&self) -> MovieDraft {
        let (year, month, day) = self.released;
        MovieDraft {
            title: self.title.to_string(),
            release_date: NaiveDate::from_ymd_opt(year, month, day),
            director: Some(self.director.to_string()),
            genre: Some(self.genre.to_string()),
            poster_url: Some(self.poster_url.to_string()),
        }
    }
}

pub static SEED_MOVIES: [SeedMovie; 5] = [
    SeedMovie {
        title: "아바타: 불과 재",
        released: (2024, 12, 20),
        director: "제임스 카메론",
        genre: "SF",
        poster_url: "https://i.namu.wiki/i/UyN7wDQJ2QnXo-RivyWd573b1K-YZ9fAFUr0nyWMZLc_vd1NW45XQBBslwhUIfrHGyqSLIqryRYb9ItDci2hvc6C6TV1g822dsIAYcmw4VLWoPldfg-060N-9ua7vghptFaEAefg7sNzxvseXqsksg.webp",
    },
    SeedMovie {
        title: "탈주",
        released: (2024, 7, 3),
        director: "이종필",
        genre: "액션",
        poster_url: "https://i.namu.wiki/i/GOCVqsctfY_ei_5gC38-8UlHqQ4ypixYpkfgGn_LcDsYpgelrJDMAlgxzrkwWZo0n0vnCcdgPgA7-_mNfScR5OkZuZU9JaGdNUZZyikeeUB19MlwR3VUdxaTjA4XHaUvyKP2LaGad9A4nVAi4ymAkg.webp",
    },
    SeedMovie {
        title: "집으로 가는 길",
        released: (2013, 12, 11),
        director: "방은진",
        genre: "드라마",
        poster_url: "https://i.namu.wiki/i/O58yKrByuDlVcPA4TXIlytF98-4mBDnVGLloYTsQeqrkklOVqXkIR2rAySTDnLmWAb_Pe4VCSsVNEFDG4kWJOI4F9TrjcyL3DD26lpQBunOZaCl1z2DH5tjRABEyRXdMmcsUEYrryf--NoP9Ezd1lw.webp",
    },
    SeedMovie {
        title: "전지적 독자 시점",
        released: (2025, 1, 1),
        director: "김병우",
        genre: "판타지",
        poster_url: "https://i.namu.wiki/i/78fa4oC92J13_-Z7Pw-_v_6TsLDJ2kBkTZqrfLm-ll9f_jgXP41H7UtUTXXCZpvTOZcIAsMqP3tsi6IfFvA2GFr8Cnto-mKubovE-MzWQeqcPVnG9LayEW46wv7UDm1lwnyYPxuiakPxi_LGLZccjQ.webp",
    },
    SeedMovie {
        title: "극장판 짱구는 못말려: 초화려! 작열하는 떡잎마을 댄서즈",
        released: (2025, 12, 24),
        director: "하시모토 마사카즈",
        genre: "애니메이션",
        poster_url: "https://i.namu.wiki/i/yyOX12GcO3Z83hCYIxFvvjaUZnf9FshyOTeoT0s28URV1EhVWfDZ_349Mj6pyOQ3WuOK-oxRS9BHp_sP8hiZYq0aEGyMp8aNTlR6PwEGiZ4GNy_WtzkTC_i-PIha4yL5wusVyP5dsPhf3_aJ6zXWZg.webp",
    },
];

/// Review sentences from very positive down to very negative
pub static SEED_REVIEWS: [&str; 16] = [
    "스토리도 탄탄하고 연출이 정말 뛰어났어요. 시간 가는 줄 모르고 봤습니다.",
    "배우들의 연기가 몰입감을 높여줘서 끝까지 재미있게 감상했어요.",
    "영상미와 음악이 잘 어우러져서 극장에서 볼 가치가 충분한 작품이었습니다.",
    "기대 이상으로 완성도가 높아서 다시 보고 싶은 영화예요.",
    "전반적으로 재미있게 봤고, 몇몇 장면은 인상 깊었습니다.",
    "조금 늘어지는 부분은 있었지만 전체적으로 만족스러웠어요.",
    "가볍게 보기 좋은 영화라서 부담 없이 즐길 수 있었습니다.",
    "무난한 영화였습니다. 나쁘지도 좋지도 않았어요.",
    "스토리는 평범했지만 연출은 괜찮은 편이었습니다.",
    "기대가 컸던 만큼 아쉬움도 조금 남는 작품이네요.",
    "스토리가 예상 가능해서 중간부터 흥미가 떨어졌습니다.",
    "연출이 다소 산만해서 몰입하기 어려웠어요.",
    "러닝타임에 비해 내용이 너무 얕게 느껴졌습니다.",
    "기대하고 봤는데 실망이 컸어요. 전개가 너무 엉성했습니다.",
    "캐릭터의 행동이 이해되지 않아서 보는 내내 답답했어요.",
    "끝까지 보기 힘들 정도로 지루했습니다.",
];

/// Outcome of a seeding run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub movies_added: usize,
    pub movies_skipped: usize,
    pub reviews_added: usize,
}

/// Demo movies whose titles are not already present
pub fn pending_movies(existing_titles: &HashSet<String>) -> Vec<&'static SeedMovie> {
    SEED_MOVIES
        .iter()
        .filter(|movie| !existing_titles.contains(movie.title))
        .collect()
}

/// `count` review drafts for a movie, authored `user0`, `user1`, ...
pub fn review_drafts<R: Rng + ?Sized>(
    rng: &mut R,
    movie_id: i64,
    count: usize,
) -> Vec<ReviewDraft> {
    (0..count)
        .filter_map(|i| {
            SEED_REVIEWS.choose(&mut *rng).map(|content| ReviewDraft {
                movie_id,
                author: format!("user{i}"),
                content: content.to_string(),
            })
        })
        .collect()
}

/// Create the demo movies that are missing and give each random reviews.
///
/// Movies already present (matched by title) are left untouched.
pub async fn seed<R: Rng + ?Sized>(
    client: &ApiClient,
    reviews_per_movie: usize,
    rng: &mut R,
) -> Result<SeedReport> {
    let existing: HashSet<String> = client
        .list_movies()
        .await?
        .into_iter()
        .map(|movie| movie.title)
        .collect();

    let pending = pending_movies(&existing);
    let mut report = SeedReport {
        movies_skipped: SEED_MOVIES.len() - pending.len(),
        ..Default::default()
    };

    for seed_movie in pending {
        let movie = client.create_movie(&seed_movie.draft()).await?;
        report.movies_added += 1;
        info!(id = movie.id, title = %movie.title, "Seeded movie");

        for draft in review_drafts(rng, movie.id, reviews_per_movie) {
            let review = client.create_review(&draft).await?;
            debug!(id = review.id, label = %review.sentiment_label, "Seeded review");
            report.reviews_added += 1;
        }
    }

    Ok(report)
}
