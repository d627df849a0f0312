//! Prompt templates for review analysis.

/// Separator placed between reviews in a prompt.
pub const REVIEW_SEPARATOR: &str = "\n\n---\n\n";

const QUALITY_TEMPLATE: &str = r#"You are reading guest reviews to decide whether a hotel has "Quality": excellent service, cleanliness, amenities, and overall guest satisfaction.

From the reviews below, determine:
1. score (0.0 to 1.0): how high the quality is
2. confidence (0.0 to 1.0): how sure you are of that score
3. reasoning: a short explanation
4. recommended (true/false): whether the hotel should be recommended on quality alone

Signals of quality:
- helpful, attentive, professional staff
- clean and well-maintained rooms and public areas
- working amenities and good facilities
- comfortable rooms and beds
- fair value for money
- consistently positive stays

Signals against quality:
- rude or unhelpful staff
- dirty or poorly maintained conditions
- broken amenities
- uncomfortable rooms or beds
- overpriced for what is offered
- safety concerns

Reviews:
{reviews}

Answer with JSON only, in exactly this shape:
{
  "score": 0.85,
  "confidence": 0.9,
  "reasoning": "Most guests praise the service and cleanliness; a few mention slow WiFi.",
  "recommended": true
}"#;

const QUIET_TEMPLATE: &str = r#"You are reading guest reviews to decide whether a hotel is "Quiet": a peaceful environment where guests can sleep without noise.

From the reviews below, determine:
1. score (0.0 to 1.0): how quiet the hotel is
2. confidence (0.0 to 1.0): how sure you are of that score
3. reasoning: a short explanation
4. isQuiet (true/false): whether the hotel is quiet

Signals of quiet:
- "quiet", "peaceful", "tranquil", "restful", "slept well"
- away from main roads, residential street, cul-de-sac
- soundproofing, thick walls, good windows
- courtyard or garden-facing rooms
- no construction nearby

Signals of noise:
- "noisy", "loud", "couldn't sleep"
- thin walls, hearing neighbours or the hallway
- construction or renovation work
- street, traffic, train, or aircraft noise
- bars, clubs, or music nearby
- rowdy guests or parties
- elevator or ice-machine noise

Reviews:
{reviews}

Answer with JSON only, in exactly this shape:
{
  "score": 0.75,
  "confidence": 0.85,
  "reasoning": "Guests describe a calm residential street; one mentions thin walls.",
  "isQuiet": true
}"#;

pub fn quality_prompt(reviews: &[String]) -> String {
    QUALITY_TEMPLATE.replace("{reviews}", &reviews.join(REVIEW_SEPARATOR))
}

pub fn quiet_prompt(reviews: &[String]) -> String {
    QUIET_TEMPLATE.replace("{reviews}", &reviews.join(REVIEW_SEPARATOR))
}
