//! Aligns "suspected definition" fragments (harvested from underline/emphasis
//! markup) onto the ordered clue list they belong to.
//!
//! Use this when clues can be extracted reliably but definitions are only
//! loosely indicated in the markup: pass the clues and the best fragment
//! candidates, and get back exactly one (possibly absent) definition per clue.
//! Matching is case sensitive; the final substring validation is not.

use std::collections::VecDeque;

use crate::error::AlignError;

/// Produce one definition per clue from a loose sequence of fragments.
///
/// Walks the clues with a cursor, consuming fragments from the front:
/// a fragment contained in the current clue joins that clue's definition
/// (`/`-separated, for double-definition clues); otherwise the first later
/// clue containing it becomes the new cursor position, padding skipped clues
/// with empty definitions. Fragments contained in no remaining clue are
/// dropped.
///
/// Fails only on contract violations: more definitions than clues, or a
/// produced definition that is not a substring of its clue. Both indicate a
/// bug upstream, not an unparsable page.
pub fn align_suspected_definitions(
    clues: &[String],
    suspected_definitions: &[String],
) -> Result<Vec<Option<String>>, AlignError> {
    let mut definitions: Vec<String> = Vec::new();
    let mut clue_index: usize = 0;
    let mut queue: VecDeque<&String> = suspected_definitions.iter().collect();

    while let Some(fragment) = queue.pop_front() {
        if clues.is_empty() {
            break;
        }
        let needle = fragment.trim();
        if needle.is_empty() {
            continue;
        }

        if clues[clue_index].contains(needle) {
            // Attach to the definition in progress for the current clue.
            while definitions.len() < clue_index {
                definitions.push(String::new());
            }
            match definitions.get_mut(clue_index) {
                Some(existing) if !existing.is_empty() => {
                    existing.push('/');
                    existing.push_str(needle);
                }
                Some(existing) => *existing = needle.to_string(),
                None => definitions.push(needle.to_string()),
            }
            continue;
        }

        // Scan forward for the first later clue containing the fragment.
        match clues[clue_index + 1..]
            .iter()
            .position(|clue| clue.contains(needle))
        {
            Some(0) => {
                // The very next clue. If the current clue never received a
                // fragment, it gets an empty placeholder so lengths stay
                // aligned.
                while definitions.len() < clue_index + 1 {
                    definitions.push(String::new());
                }
                clue_index += 1;
                definitions.push(needle.to_string());
            }
            Some(offset) => {
                // One or more fully unmatched clues in between: pad them out,
                // requeue the fragment, and let the next iteration attach it
                // to the clue it actually belongs to.
                while definitions.len() < clue_index + offset {
                    definitions.push(String::new());
                }
                clue_index += offset;
                queue.push_front(fragment);
            }
            None => {
                // Contained in no remaining clue; drop it.
            }
        }
    }

    if definitions.len() > clues.len() {
        return Err(AlignError::TooManyDefinitions {
            produced: definitions.len(),
            clues: clues.len(),
        });
    }
    while definitions.len() < clues.len() {
        definitions.push(String::new());
    }

    for (definition, clue) in definitions.iter().zip(clues) {
        if definition.is_empty() {
            continue;
        }
        let clue_lower = clue.to_lowercase();
        for part in definition.split('/') {
            if !clue_lower.contains(&part.trim().to_lowercase()) {
                return Err(AlignError::DefinitionMismatch {
                    definition: definition.clone(),
                    clue: clue.clone(),
                });
            }
        }
    }

    Ok(definitions
        .into_iter()
        .map(|d| if d.is_empty() { None } else { Some(d) })
        .collect())
}
