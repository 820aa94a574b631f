use super::SolveContext;
use crate::error::{NameForgeError, NfResult};
use crate::letters::LetterBag;
use crate::phonotactics::SegmentState;
use crate::template::SegmentRole;
use fastrand::Rng;

/// Insertion points tried per leftover letter.
pub const MAX_INSERTION_POINTS: usize = 48;

/// Fills every non-fixed segment from `pool` (the input letters minus the
/// fixed segments), in template order. The caller's pool is never touched;
/// the attempt works on its own copy.
pub fn construct(
    ctx: &SolveContext,
    pool: LetterBag,
    temperature: f32,
    rng: &mut Rng,
) -> NfResult<Vec<String>> {
    let specs = &ctx.template.segments;
    let mut bag = pool;
    let mut texts: Vec<String> = ctx
        .fixed
        .iter()
        .map(|f| f.clone().unwrap_or_default())
        .collect();

    let free: Vec<usize> = (0..specs.len()).filter(|&i| !ctx.is_frozen(i)).collect();

    for (step, &idx) in free.iter().enumerate() {
        let spec = specs[idx];
        let later = &free[step + 1..];
        let remaining = bag.total();

        let (lo, hi) = if later.is_empty() {
            (spec.min_len, spec.max_len.min(remaining))
        } else {
            let later_min: usize = later.iter().map(|&j| specs[j].min_len).sum();
            let later_max: usize = later.iter().map(|&j| specs[j].max_len).sum();
            (
                spec.min_len.max(remaining.saturating_sub(later_max)),
                spec.max_len.min(remaining.saturating_sub(later_min)),
            )
        };
        if lo > hi {
            return Err(NameForgeError::ConstructionFailure(format!(
                "no room for segment {} ({} letters left)",
                idx, remaining
            )));
        }

        // The last segment takes everything it can hold.
        let target = if later.is_empty() {
            hi
        } else {
            rng.usize(lo..=hi)
        };
        texts[idx] = build_segment(ctx, idx, &mut bag, lo, target, temperature, rng)?;
    }

    if !bag.is_exhausted() {
        distribute_remaining(ctx, &mut texts, &mut bag)?;
    }
    Ok(texts)
}

/// Grows one segment character by character. Stops early once `min_len`
/// is reached and no letter can legally follow.
pub fn build_segment(
    ctx: &SolveContext,
    idx: usize,
    bag: &mut LetterBag,
    min_len: usize,
    target: usize,
    temperature: f32,
    rng: &mut Rng,
) -> NfResult<String> {
    let model = ctx.models[idx];
    let mut state = SegmentState::new();
    let mut allowed: Vec<u8> = Vec::with_capacity(26);

    for pos in 0..target {
        let remaining_after = target - pos - 1;
        allowed.clear();
        allowed.extend(
            bag.available()
                .filter(|&c| ctx.checker.can_extend(&state, c, remaining_after)),
        );

        let Some(c) = model.sample_next(state.text(), &allowed, temperature, rng) else {
            if state.len() >= min_len {
                break;
            }
            return Err(NameForgeError::ConstructionFailure(format!(
                "no legal letter after '{}'",
                state.as_string()
            )));
        };
        bag.consume(c)?;
        state.push(c);
    }

    let text = state.as_string();
    if !ctx.checker.is_valid_segment(&text) {
        return Err(NameForgeError::ConstructionFailure(format!(
            "'{}' is not pronounceable",
            text
        )));
    }
    ctx.filter.check(&text)?;
    Ok(text)
}

/// Places leftover letters one at a time (alphabetical order) where they
/// raise the segment's model score most. Greedy; the first best position
/// wins ties.
pub fn distribute_remaining(
    ctx: &SolveContext,
    texts: &mut [String],
    bag: &mut LetterBag,
) -> NfResult<()> {
    let specs = &ctx.template.segments;

    for c in bag.as_sorted_string().bytes() {
        let mut best: Option<(f32, usize, String)> = None;
        let mut tried = 0;

        'segments: for (idx, text) in texts.iter().enumerate() {
            let spec = specs[idx];
            if ctx.is_frozen(idx)
                || spec.role == SegmentRole::Initial
                || spec.max_len <= 1
                || text.len() >= spec.max_len
            {
                continue;
            }
            let model = ctx.models[idx];
            let base = model.score_segment(text);

            for pos in 0..=text.len() {
                if tried >= MAX_INSERTION_POINTS {
                    break 'segments;
                }
                tried += 1;

                let mut grown = String::with_capacity(text.len() + 1);
                grown.push_str(&text[..pos]);
                grown.push(c as char);
                grown.push_str(&text[pos..]);
                if !ctx.is_legal(&grown) {
                    continue;
                }

                let delta = model.score_segment(&grown) - base;
                if best.as_ref().map_or(true, |(d, _, _)| delta > *d) {
                    best = Some((delta, idx, grown));
                }
            }
        }

        let Some((_, idx, grown)) = best else {
            return Err(NameForgeError::ConstructionFailure(format!(
                "no room for leftover '{}'",
                c as char
            )));
        };
        bag.consume(c)?;
        texts[idx] = grown;
    }
    Ok(())
}
