//! Randomized payloads for creating resources.
//!
//! Every call draws fresh values from the thread-local RNG; nothing is
//! seeded, so two runs never send the same data. Generated values always
//! satisfy the resource schemas: emails match `EMAIL_PATTERN`, `userId`
//! falls in the seed dataset's 1..=10 range, text fields are non-empty.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::types::{Address, Company, Geo, NewComment, NewPost, NewTodo, NewUser};

/// Inclusive range of user ids present in the sandbox seed data.
pub const SEED_USER_IDS: std::ops::RangeInclusive<u64> = 1..=10;

const FIRST_NAMES: &[&str] = &[
    "Ana", "Bruno", "Carla", "Diego", "Elena", "Felipe", "Gabriela", "Hugo", "Isabel", "Joao",
    "Karen", "Lucas", "Marina", "Nelson", "Olivia", "Pedro", "Renata", "Samuel", "Tatiana", "Victor",
];

const LAST_NAMES: &[&str] = &[
    "Almeida", "Barbosa", "Cardoso", "Duarte", "Esteves", "Ferreira", "Gomes", "Henriques",
    "Lopes", "Moreira", "Nunes", "Oliveira", "Pereira", "Ramos", "Santos", "Teixeira",
];

const EMAIL_DOMAINS: &[&str] = &["example.com", "mail.test", "inbox.dev", "post.org", "corp.io"];

const STREETS: &[&str] = &[
    "Kulas Light", "Victor Plains", "Douglas Extension", "Hoeger Mall", "Skiles Walks",
    "Norberto Crossing", "Rex Trail", "Ellsworth Summit",
];

const CITIES: &[&str] = &[
    "Gwenborough", "Wisokyburgh", "McKenziehaven", "South Elvis", "Roscoeview", "South Christy",
    "Howemouth", "Aliyaview",
];

const COMPANY_SUFFIXES: &[&str] = &["Group", "LLC", "Inc", "and Sons", "Partners"];

const BUZZWORDS: &[&str] = &[
    "multi-layered", "proactive", "face to face", "synergized", "configurable", "user-centric",
    "distributed", "fault-tolerant", "real-time", "scalable",
];

const NOUNS: &[&str] = &[
    "neural-net", "didactic contingency", "bandwidth", "toolset", "framework", "hub",
    "interface", "middleware", "paradigm", "throughput",
];

const LOREM: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
    "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi",
];

fn pick<R: Rng + ?Sized>(rng: &mut R, words: &[&'static str]) -> &'static str {
    words.choose(rng).copied().unwrap_or("lorem")
}

/// A capitalized sentence of 4..=9 lorem words, without trailing period.
pub fn sentence() -> String {
    sentence_with(&mut rand::thread_rng())
}

fn sentence_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let count = rng.gen_range(4..=9);
    let words: Vec<&str> = (0..count).map(|_| pick(rng, LOREM)).collect();
    let mut text = words.join(" ");
    if let Some(first) = text.get(0..1) {
        let upper = first.to_ascii_uppercase();
        text.replace_range(0..1, &upper);
    }
    text
}

fn paragraph_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let count = rng.gen_range(3..=5);
    (0..count)
        .map(|_| format!("{}.", sentence_with(rng)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `first.last<n>@domain`; always matches `EMAIL_PATTERN`.
pub fn email() -> String {
    let mut rng = rand::thread_rng();
    let first = pick(&mut rng, FIRST_NAMES);
    let last = pick(&mut rng, LAST_NAMES);
    email_for(&mut rng, first, last)
}

fn email_for<R: Rng + ?Sized>(rng: &mut R, first: &str, last: &str) -> String {
    let n: u16 = rng.gen_range(1..1000);
    format!(
        "{}.{}{n}@{}",
        first.to_ascii_lowercase(),
        last.to_ascii_lowercase(),
        pick(rng, EMAIL_DOMAINS)
    )
}

pub fn seed_user_id() -> u64 {
    rand::thread_rng().gen_range(SEED_USER_IDS)
}

pub fn user() -> NewUser {
    let mut rng = rand::thread_rng();
    let first = pick(&mut rng, FIRST_NAMES);
    let last = pick(&mut rng, LAST_NAMES);
    let email = email_for(&mut rng, first, last);
    let username = format!("{}_{}{}", first.to_ascii_lowercase(), last.to_ascii_lowercase(), rng.gen_range(10..100));
    let phone = format!(
        "{}-{:03}-{:03}-{:04}",
        rng.gen_range(1..10),
        rng.gen_range(100..1000),
        rng.gen_range(100..1000),
        rng.gen_range(0..10000)
    );
    let company_name = format!("{} {}", pick(&mut rng, LAST_NAMES), pick(&mut rng, COMPANY_SUFFIXES));

    NewUser {
        name: format!("{first} {last}"),
        username,
        email,
        phone,
        website: format!("https://{}.example.com", last.to_ascii_lowercase()),
        address: Address {
            street: pick(&mut rng, STREETS).to_string(),
            suite: Some(format!("Apt. {}", rng.gen_range(100..1000))),
            city: pick(&mut rng, CITIES).to_string(),
            zipcode: format!("{:05}-{:04}", rng.gen_range(10000..100000), rng.gen_range(0..10000)),
            geo: Some(Geo {
                lat: format!("{:.4}", rng.gen_range(-90.0..90.0_f64)),
                lng: format!("{:.4}", rng.gen_range(-180.0..180.0_f64)),
            }),
        },
        company: Company {
            name: company_name,
            catch_phrase: format!("{} {}", pick(&mut rng, BUZZWORDS), pick(&mut rng, NOUNS)),
            bs: Some(format!("{} {}", pick(&mut rng, BUZZWORDS), pick(&mut rng, NOUNS))),
        },
    }
}

pub fn post() -> NewPost {
    let mut rng = rand::thread_rng();
    NewPost {
        user_id: rng.gen_range(SEED_USER_IDS),
        title: sentence_with(&mut rng),
        body: format!("{}\n{}", paragraph_with(&mut rng), paragraph_with(&mut rng)),
    }
}

pub fn comment() -> NewComment {
    let mut rng = rand::thread_rng();
    let first = pick(&mut rng, FIRST_NAMES);
    let last = pick(&mut rng, LAST_NAMES);
    NewComment {
        name: sentence_with(&mut rng),
        email: email_for(&mut rng, first, last),
        body: paragraph_with(&mut rng),
    }
}

pub fn todo() -> NewTodo {
    let mut rng = rand::thread_rng();
    NewTodo {
        user_id: rng.gen_range(SEED_USER_IDS),
        title: sentence_with(&mut rng),
        completed: rng.gen_bool(0.5),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::is_valid_email;
    use crate::schemas;

    #[test]
    fn emails_always_match_pattern() {
        for _ in 0..500 {
            let email = email();
            assert!(is_valid_email(&email), "{email}");
        }
    }

    #[test]
    fn user_ids_stay_in_seed_range() {
        for _ in 0..200 {
            assert!(SEED_USER_IDS.contains(&post().user_id));
            assert!(SEED_USER_IDS.contains(&todo().user_id));
            assert!(SEED_USER_IDS.contains(&seed_user_id()));
        }
    }

    #[test]
    fn text_fields_are_non_empty() {
        for _ in 0..100 {
            let post = post();
            assert!(!post.title.is_empty() && !post.body.is_empty());
            let comment = comment();
            assert!(!comment.name.is_empty() && !comment.body.is_empty());
            assert!(is_valid_email(&comment.email), "{}", comment.email);
            assert!(!todo().title.is_empty());
        }
    }

    #[test]
    fn sentence_is_capitalized() {
        let s = sentence();
        assert!(s.chars().next().unwrap().is_ascii_uppercase(), "{s}");
    }

    #[test]
    fn generated_payloads_pass_resource_schemas_once_id_assigned() {
        for _ in 0..50 {
            let mut user = serde_json::to_value(user()).unwrap();
            user["id"] = 11.into();
            assert!(schemas::USER.validate(&user).is_empty(), "{user}");

            let mut post = serde_json::to_value(post()).unwrap();
            post["id"] = 101.into();
            assert!(schemas::POST.validate(&post).is_empty(), "{post}");

            let mut comment = serde_json::to_value(comment()).unwrap();
            comment["id"] = 501.into();
            comment["postId"] = 1.into();
            assert!(schemas::COMMENT.validate(&comment).is_empty(), "{comment}");

            let mut todo = serde_json::to_value(todo()).unwrap();
            todo["id"] = 201.into();
            assert!(schemas::TODO.validate(&todo).is_empty(), "{todo}");
        }
    }

    #[test]
    fn consecutive_payloads_differ() {
        let emails: std::collections::HashSet<String> = (0..20).map(|_| email()).collect();
        assert!(emails.len() > 1);
    }
}
