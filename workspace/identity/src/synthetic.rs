//! Randomized user data for seeding development databases.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate, Utc};
use rand::rngs::ThreadRng;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::factory::UserFields;
use crate::phone::PhoneRegion;

/// Password given to every generated user.
pub const PLACEHOLDER_PASSWORD: &str = "Password@123";

const FIRST_NAMES: &[&str] = &[
    "Aarav", "Aditi", "Alice", "Arjun", "Bob", "Carmen", "Chen", "Dev", "Diya", "Elena", "Farah",
    "George", "Hana", "Ishaan", "Jonas", "Kavya", "Liam", "Maya", "Nikhil", "Olivia", "Priya",
    "Quentin", "Rahul", "Sara", "Tomas", "Uma", "Vikram", "Wen", "Yusuf", "Zoe",
];

const LAST_NAMES: &[&str] = &[
    "Agarwal", "Brown", "Chowdhury", "Dubois", "Evans", "Fernandes", "Gupta", "Hughes", "Iyer",
    "Jensen", "Kapoor", "Lopez", "Mehta", "Novak", "Okafor", "Patel", "Quinn", "Reddy", "Singh",
    "Tanaka", "Usman", "Verma", "Walker", "Xu", "Yadav", "Zimmerman",
];

const EMAIL_DOMAINS: &[&str] = &["example.com", "example.org", "example.net"];

/// Random suffixes are drawn from `1..RANDOM_SUFFIX_LIMIT`; past that range a
/// per-generator counter takes over.
const RANDOM_SUFFIX_LIMIT: u32 = 10_000;
const RANDOM_SUFFIX_ATTEMPTS: usize = 32;

const MIN_AGE_YEARS: i64 = 18;
const MAX_AGE_YEARS: i64 = 80;

/// Generator of plausible user fields.
///
/// Usernames are unique among everything one generator has produced, and
/// emails are derived from them, so a batch never collides with itself. It
/// may still collide with rows already in the database.
#[derive(Debug)]
pub struct SyntheticUsers<R: Rng = ThreadRng> {
    rng: R,
    region: PhoneRegion,
    seen: HashSet<String>,
    next_counter: u64,
}

impl SyntheticUsers<ThreadRng> {
    pub fn new(region: PhoneRegion) -> Self {
        Self::with_rng(rand::thread_rng(), region)
    }
}

impl<R: Rng> SyntheticUsers<R> {
    pub fn with_rng(rng: R, region: PhoneRegion) -> Self {
        Self {
            rng,
            region,
            seen: HashSet::new(),
            next_counter: u64::from(RANDOM_SUFFIX_LIMIT),
        }
    }

    /// Fields for one user. The password is left unset; callers attach the
    /// shared placeholder hash.
    pub fn next_fields(&mut self) -> UserFields {
        let first = pick(&mut self.rng, FIRST_NAMES);
        let last = pick(&mut self.rng, LAST_NAMES);
        let username = self.unique_username(first, last);
        let domain = pick(&mut self.rng, EMAIL_DOMAINS);

        UserFields {
            email: format!("{}@{}", username, domain),
            full_name: format!("{} {}", first, last),
            phone_number: self.region.sample(&mut self.rng),
            date_of_birth: self.date_of_birth(),
            username,
            password: None,
        }
    }

    pub fn generate(&mut self, total: usize) -> Vec<UserFields> {
        (0..total).map(|_| self.next_fields()).collect()
    }

    fn unique_username(&mut self, first: &str, last: &str) -> String {
        let base = format!("{}.{}", first, last).to_lowercase();
        for _ in 0..RANDOM_SUFFIX_ATTEMPTS {
            let candidate = format!("{}{}", base, self.rng.gen_range(1..RANDOM_SUFFIX_LIMIT));
            if self.seen.insert(candidate.clone()) {
                return candidate;
            }
        }

        // The random range for this base is crowded; counter suffixes sit
        // above it and only grow, so this terminates.
        loop {
            let candidate = format!("{}{}", base, self.next_counter);
            self.next_counter += 1;
            if self.seen.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    fn date_of_birth(&mut self) -> NaiveDate {
        let age_days = self
            .rng
            .gen_range(MIN_AGE_YEARS * 365..=MAX_AGE_YEARS * 365);
        Utc::now().date_naive() - Duration::days(age_days)
    }
}

fn pick<'a, R: Rng>(rng: &mut R, options: &[&'a str]) -> &'a str {
    options.choose(rng).copied().unwrap_or_default()
}
