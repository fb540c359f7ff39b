use progress::{AchievementPopup, SkillDef};

/// Collects user-visible lines. The loop runner prints them after each command.
#[derive(Debug, Default)]
pub(crate) struct Notifier {
    lines: Vec<String>,
}

impl Notifier {
    pub(crate) fn message(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub(crate) fn achievement_popup(&mut self, popup: &AchievementPopup) {
        self.lines.push(format!(
            "Achievement Unlocked! {} {} - {}",
            popup.icon, popup.name, popup.description
        ));
    }

    pub(crate) fn skill_details(&mut self, def: &SkillDef) {
        self.lines.push(format!(
            "{} [{}] MP {} | {} | EXP {}",
            def.title, def.skill_type, def.mp_cost, def.level, def.exp
        ));
        self.lines.push(format!("  {}", def.description));
    }

    pub(crate) fn drain_lines(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use progress::{AchievementId, SkillId};

    #[test]
    fn popup_renders_icon_name_and_description() {
        let mut notifier = Notifier::default();

        notifier.achievement_popup(&AchievementPopup::for_achievement(
            AchievementId::FirstSteps,
        ));

        assert_eq!(
            notifier.drain_lines(),
            vec!["Achievement Unlocked! 👣 First Steps - Start your journey".to_string()]
        );
        assert!(notifier.drain_lines().is_empty());
    }

    #[test]
    fn skill_details_span_two_lines() {
        let mut notifier = Notifier::default();

        notifier.skill_details(SkillId::Ux.def());

        let lines = notifier.drain_lines();
        assert_eq!(lines[0], "🎨 UX Alchemy [Support Skill] MP 8 | Lv. 90 | EXP 5400/6000");
        assert!(lines[1].starts_with("  Transforms user frustration"));
    }
}
