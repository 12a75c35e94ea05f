//! Store Person records as JSON lines and read them back.
//!
//! Start a server first:
//! ```text
//! cargo run --bin linestore-server
//! cargo run --example people
//! ```

use chrono::{DateTime, Utc};
use linestore::{Client, Config, LineStore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Mood {
    Happy,
    Sad,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Person {
    id: String,
    name: String,
    age: u32,
    dob: DateTime<Utc>,
    moods: Vec<Mood>,
}

impl Person {
    fn new(name: &str, age: u32, moods: Vec<Mood>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            age,
            dob: Utc::now(),
            moods,
        }
    }
}

fn main() -> linestore::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("info,linestore=debug"))
        .init();

    let mut client = Client::connect(Config::builder().page_size(2).build())?;
    let result = run(&mut client);
    client.close();
    result
}

fn run(client: &mut Client) -> linestore::Result<()> {
    use Mood::{Happy, Sad};

    let person = Person::new("John Doe", 30, vec![Happy, Sad, Happy, Happy]);
    client.set_json(&person.name, &person)?;

    let stored: Person = client.get_json(&person.name)?;
    println!("{:?}", stored);
    println!("{}", stored.name);
    println!("{}", stored.age);
    println!("{}", stored.dob);

    println!("=====================================");

    let people = vec![
        Person::new("John Doe", 30, vec![Happy, Sad, Happy, Happy]),
        Person::new("Jane Doe", 25, vec![Happy, Happy, Happy, Happy]),
    ];
    client.set_json("people", &people)?;

    let stored: Vec<Person> = client.get_json("people")?;
    for person in &stored {
        println!("{:?}", person);
        println!("{}", person.id);
        println!("{}", person.name);
        println!("{}", person.age);
        println!("{}", person.dob);
        println!();
    }

    Ok(())
}
