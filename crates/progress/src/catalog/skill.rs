use std::fmt;
use std::str::FromStr;

use super::UnknownIdError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkillId {
    Frontend,
    Backend,
    Ux,
    Leadership,
    Devops,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillDef {
    pub id: SkillId,
    pub title: &'static str,
    pub skill_type: &'static str,
    pub mp_cost: u32,
    pub description: &'static str,
    pub level: &'static str,
    pub exp: &'static str,
}

const SKILL_DEFS: [SkillDef; 5] = [
    SkillDef {
        id: SkillId::Frontend,
        title: "⚡ Frontend Mastery",
        skill_type: "Combat Skill",
        mp_cost: 12,
        description: "Master of the visible realm. Crafts immersive user interfaces with HTML5, CSS3, and JavaScript. Specializes in React ecosystem and responsive design.",
        level: "Lv. 85",
        exp: "4250/5000",
    },
    SkillDef {
        id: SkillId::Backend,
        title: "🔮 Backend Wizardry",
        skill_type: "Magic Skill",
        mp_cost: 20,
        description: "Commands the server-side forces with Node.js and Express. Creates RESTful APIs and practices database sorcery with MongoDB and PostgreSQL.",
        level: "Lv. 70",
        exp: "2800/4000",
    },
    SkillDef {
        id: SkillId::Ux,
        title: "🎨 UX Alchemy",
        skill_type: "Support Skill",
        mp_cost: 8,
        description: "Transforms user frustration into delightful experiences. Conducts usability rituals and turns complex workflows into intuitive journeys.",
        level: "Lv. 90",
        exp: "5400/6000",
    },
    SkillDef {
        id: SkillId::Leadership,
        title: "👑 Team Leadership",
        skill_type: "Leadership Skill",
        mp_cost: 25,
        description: "Inspires parties to achieve legendary quests. Masters agile ceremonies and sprint planning. Buffs team morale and productivity stats.",
        level: "Lv. 88",
        exp: "5280/5500",
    },
    SkillDef {
        id: SkillId::Devops,
        title: "⚙️ DevOps Engineering",
        skill_type: "Technical Skill",
        mp_cost: 15,
        description: "Bridges the realms of development and operations. Automates deployment rituals with CI/CD scrolls and containerizes applications.",
        level: "Lv. 65",
        exp: "2600/4000",
    },
];

impl SkillId {
    pub const ALL: [SkillId; 5] = [
        SkillId::Frontend,
        SkillId::Backend,
        SkillId::Ux,
        SkillId::Leadership,
        SkillId::Devops,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SkillId::Frontend => "frontend",
            SkillId::Backend => "backend",
            SkillId::Ux => "ux",
            SkillId::Leadership => "leadership",
            SkillId::Devops => "devops",
        }
    }

    pub fn def(self) -> &'static SkillDef {
        // Table order matches declaration order.
        &SKILL_DEFS[self as usize]
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkillId {
    type Err = UnknownIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        SkillId::ALL
            .into_iter()
            .find(|skill| skill.as_str() == value)
            .ok_or_else(|| UnknownIdError::new("skill", value, SkillId::ALL.map(SkillId::as_str)))
    }
}
