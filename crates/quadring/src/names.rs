//! Random display names: an animal followed by an adjective that agrees
//! with the animal's grammatical gender, e.g. "Onça Veloz", "Urso Generoso".

use rand::Rng;
use rand::seq::IndexedRandom;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gender {
    Masculine,
    Feminine,
}

const ANIMALS: &[(&str, Gender)] = &[
    ("Urso", Gender::Masculine),
    ("Cachorro", Gender::Masculine),
    ("Elefante", Gender::Masculine),
    ("Tigre", Gender::Masculine),
    ("Gato", Gender::Masculine),
    ("Leão", Gender::Masculine),
    ("Onça", Gender::Feminine),
    ("Mamute", Gender::Masculine),
    ("Lobo", Gender::Masculine),
    ("Rato", Gender::Masculine),
    ("Girafa", Gender::Feminine),
    ("Arara", Gender::Feminine),
    ("Cobra", Gender::Feminine),
    ("Vaca", Gender::Feminine),
    ("Galinha", Gender::Feminine),
    ("Gaivota", Gender::Feminine),
    ("Cavalo", Gender::Masculine),
    ("Dinossauro", Gender::Masculine),
];

/// (masculine, feminine)
const ADJECTIVES: &[(&str, &str)] = &[
    ("Generoso", "Generosa"),
    ("Inteligente", "Inteligente"),
    ("Veloz", "Veloz"),
    ("Ligeiro", "Ligeira"),
    ("Bebê", "Bebê"),
];

/// Draws a player name from `rng`.
pub fn random_player_name(rng: &mut impl Rng) -> String {
    let (animal, gender) = ANIMALS.choose(rng).copied().unwrap_or(("Urso", Gender::Masculine));
    let (masculine, feminine) = ADJECTIVES.choose(rng).copied().unwrap_or(("Veloz", "Veloz"));
    let adjective = match gender {
        Gender::Masculine => masculine,
        Gender::Feminine => feminine,
    };
    format!("{animal} {adjective}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_name_is_animal_then_adjective() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let name = random_player_name(&mut rng);
            let (animal, adjective) = name.split_once(' ').expect("two words");
            let gender = ANIMALS
                .iter()
                .find(|(a, _)| *a == animal)
                .map(|(_, g)| *g)
                .expect("known animal");
            let agrees = ADJECTIVES.iter().any(|(m, f)| match gender {
                Gender::Masculine => *m == adjective,
                Gender::Feminine => *f == adjective,
            });
            assert!(agrees, "{name} does not agree in gender");
        }
    }

    #[test]
    fn test_feminine_animals_take_feminine_forms() {
        let mut rng = StdRng::seed_from_u64(3);
        let names: Vec<String> = (0..200).map(|_| random_player_name(&mut rng)).collect();
        assert!(!names.iter().any(|n| n == "Girafa Generoso" || n == "Arara Ligeiro"));
        assert!(!names.iter().any(|n| n == "Urso Generosa" || n == "Lobo Ligeira"));
    }

    #[test]
    fn test_same_seed_same_name() {
        let a = random_player_name(&mut StdRng::seed_from_u64(99));
        let b = random_player_name(&mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }
}
